use std::{fmt::Debug, sync::Arc};

use crate::logging::render_transition;

/// A feature's state machine: folds actions into state.
pub trait Reducer {
    type State;
    type Action;

    fn reduce(&self, state: &mut Self::State, action: Self::Action);
}

/// Receives every transition of a reducer wrapped with [`print_changes`].
pub struct ReducerPrinter<S, A> {
    print: Arc<dyn Fn(&A, &S, &S) + Send + Sync>,
}

impl<S, A> ReducerPrinter<S, A> {
    pub fn new(print: impl Fn(&A, &S, &S) + Send + Sync + 'static) -> Self {
        Self {
            print: Arc::new(print),
        }
    }

    /// Report that `action` moved the state from `old_state` to `new_state`.
    pub fn print_change(&self, action: &A, old_state: &S, new_state: &S) {
        (self.print)(action, old_state, new_state);
    }
}

impl<S: Debug, A: Debug> ReducerPrinter<S, A> {
    /// Printer that writes each transition to stdout.
    pub fn custom_dump() -> Self {
        Self::new(|action, old_state, new_state| {
            print!("{}", render_transition(action, old_state, new_state));
        })
    }
}

impl<S, A> Clone for ReducerPrinter<S, A> {
    fn clone(&self) -> Self {
        Self {
            print: Arc::clone(&self.print),
        }
    }
}

impl<S, A> Debug for ReducerPrinter<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReducerPrinter").finish_non_exhaustive()
    }
}

/// Wrap `reducer` so that `printer` sees every transition it makes.
pub fn print_changes<R: Reducer>(
    reducer: R,
    printer: ReducerPrinter<R::State, R::Action>,
) -> PrintChanges<R> {
    PrintChanges { reducer, printer }
}

/// Reducer returned by [`print_changes`].
pub struct PrintChanges<R: Reducer> {
    reducer: R,
    printer: ReducerPrinter<R::State, R::Action>,
}

impl<R> Reducer for PrintChanges<R>
where
    R: Reducer,
    R::State: Clone,
    R::Action: Clone,
{
    type State = R::State;
    type Action = R::Action;

    fn reduce(&self, state: &mut Self::State, action: Self::Action) {
        let old_state = state.clone();
        let received = action.clone();

        self.reducer.reduce(state, action);
        self.printer.print_change(&received, &old_state, state);
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use super::*;

    struct Counter;

    #[derive(Clone, Debug)]
    enum Action {
        Increment,
        Noop,
    }

    impl Reducer for Counter {
        type State = u32;
        type Action = Action;

        fn reduce(&self, state: &mut u32, action: Action) {
            if let Action::Increment = action {
                *state += 1;
            }
        }
    }

    #[test]
    fn printer_sees_old_and_new_state() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let printer = ReducerPrinter::new({
            let seen = Arc::clone(&seen);
            move |action: &Action, old: &u32, new: &u32| {
                seen.lock().unwrap().push((format!("{action:?}"), *old, *new));
            }
        });

        let reducer = print_changes(Counter, printer);
        let mut state = 0;
        reducer.reduce(&mut state, Action::Increment);
        reducer.reduce(&mut state, Action::Noop);

        assert_eq!(state, 1);
        assert_eq!(
            *seen.lock().unwrap(),
            [
                ("Increment".to_string(), 0, 1),
                ("Noop".to_string(), 1, 1)
            ]
        );
    }

    #[test]
    fn clones_share_callback() {
        let count = Arc::new(Mutex::new(0));
        let printer = ReducerPrinter::<u32, Action>::new({
            let count = Arc::clone(&count);
            move |_, _, _| *count.lock().unwrap() += 1
        });

        printer.clone().print_change(&Action::Noop, &0, &0);
        printer.print_change(&Action::Noop, &0, &0);

        assert_eq!(*count.lock().unwrap(), 2);
    }
}
