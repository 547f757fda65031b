// ============================================================================
// REACTIVITY - Estado observable con notificación a subscribers
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

type Callback = Box<dyn Fn()>;

/// Estado reactivo compartido. Los clones comparten valor y subscribers
/// (la vista se suscribe, los viewmodels escriben).
pub struct ReactiveState<T> {
    value: Rc<RefCell<T>>,
    subscribers: Rc<RefCell<Vec<Callback>>>,
}

impl<T> ReactiveState<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Referencia al valor interno (para lecturas sin clonar)
    pub fn get(&self) -> Rc<RefCell<T>> {
        self.value.clone()
    }

    /// Establece un valor nuevo y notifica
    pub fn set(&self, new_value: T) {
        *self.value.borrow_mut() = new_value;
        self.notify();
    }

    /// Actualiza el valor in situ y notifica
    pub fn update<F>(&self, updater: F)
    where
        F: FnOnce(&mut T),
    {
        updater(&mut self.value.borrow_mut());
        self.notify();
    }

    /// Suscribirse a cambios. No registrar subscribers desde dentro de un
    /// callback de notificación.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.subscribers.borrow_mut().push(Box::new(callback));
    }

    fn notify(&self) {
        for callback in self.subscribers.borrow().iter() {
            callback();
        }
    }
}

impl<T: Clone> ReactiveState<T> {
    pub fn get_cloned(&self) -> T {
        self.value.borrow().clone()
    }
}

impl<T> Clone for ReactiveState<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            subscribers: self.subscribers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_notifies_subscribers() {
        let state = ReactiveState::new(0);
        let seen = Rc::new(RefCell::new(0));
        let seen_clone = seen.clone();
        state.subscribe(move || *seen_clone.borrow_mut() += 1);

        state.set(1);
        state.update(|v| *v += 1);

        assert_eq!(state.get_cloned(), 2);
        assert_eq!(*seen.borrow(), 2);
    }

    #[test]
    fn clones_share_value_and_subscribers() {
        let state = ReactiveState::new(String::new());
        let alias = state.clone();
        alias.set("hola".to_string());
        assert_eq!(state.get_cloned(), "hola");
    }
}
