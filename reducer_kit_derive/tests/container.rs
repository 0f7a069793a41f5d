use std::{sync::Arc, thread};

use reducer_kit::{
    Sendable,
    cache::{CacheContainer, CacheError},
    in_memory_container,
};

#[in_memory_container]
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub token: String,
}

#[in_memory_container]
#[derive(Clone, Debug, PartialEq, Sendable)]
pub struct Settings {
    pub theme: String,
}

fn session(token: &str) -> Session {
    Session {
        token: token.to_string(),
    }
}

fn assert_sendable<T: Sendable>() {}

fn assert_send_sync<T: Send + Sync>() {}

fn roundtrip<C: CacheContainer>(container: &C, model: C::Model) -> Result<C::Model, CacheError> {
    container.save(model)?;
    container.get()
}

#[test]
fn capability_supplied_or_declared() {
    assert_sendable::<Session>();
    assert_sendable::<Settings>();
    assert_send_sync::<SessionContainer>();
}

#[test]
fn default_is_empty_stand_in() {
    let container = SessionContainer::default();

    assert_eq!(container.get(), Err(CacheError::NoDataFound));
    assert_eq!(container.save(session("abc")), Ok(()));
    assert_eq!(container.get(), Err(CacheError::NoDataFound));
    assert_eq!(container.delete(), Ok(()));
}

#[test]
fn live_stores_one_value() {
    let container = SessionContainer::live();

    assert_eq!(container.get(), Err(CacheError::NoDataFound));
    assert_eq!(roundtrip(&container, session("abc")), Ok(session("abc")));

    container.save(session("def")).unwrap();
    assert_eq!((container.get)(), Ok(session("def")));

    container.delete().unwrap();
    assert_eq!(container.get(), Err(CacheError::NoDataFound));
}

#[test]
fn live_get_returns_copies() {
    let container = SessionContainer::live();
    container.save(session("abc")).unwrap();

    let mut copy = container.get().unwrap();
    copy.token.push_str("-edited");

    assert_eq!(container.get(), Ok(session("abc")));
}

#[test]
fn clones_share_live_storage() {
    let container = SettingsContainer::live();
    let clone = container.clone();

    clone
        .save(Settings {
            theme: "dark".to_string(),
        })
        .unwrap();

    assert_eq!(container.get().unwrap().theme, "dark");
}

#[test]
fn custom_operations() {
    let container = SessionContainer::new(
        || Ok(session("fixed")),
        |_| Err(CacheError::Storage("read only".to_string())),
        || Ok(()),
    );

    assert_eq!(container.get(), Ok(session("fixed")));
    assert_eq!(
        container.save(session("other")),
        Err(CacheError::Storage("read only".to_string()))
    );
}

#[test]
fn concurrent_access() {
    let container = Arc::new(SessionContainer::live());

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let container = Arc::clone(&container);
            thread::spawn(move || {
                for i in 0..100 {
                    container.save(session(&format!("{n}-{i}"))).unwrap();
                    // Another thread may have deleted it in between.
                    match container.get() {
                        Ok(session) => assert!(session.token.contains('-')),
                        Err(error) => assert_eq!(error, CacheError::NoDataFound),
                    }
                    if i % 10 == 0 {
                        container.delete().unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    container.save(session("final")).unwrap();
    assert_eq!(container.get(), Ok(session("final")));
}
