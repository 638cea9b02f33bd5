use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

/// Single-threaded publish/subscribe channel for one field group
pub struct Topic<T> {
    listeners: Rc<RefCell<Vec<Listener<T>>>>,
}

impl<T: 'static> Topic<T> {
    pub fn new() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Register `listener`; it stays registered until the returned
    /// [`Subscription`] is dropped
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let listener: Listener<T> = Rc::new(listener);
        self.listeners.borrow_mut().push(Rc::clone(&listener));

        let listeners: Weak<RefCell<Vec<Listener<T>>>> = Rc::downgrade(&self.listeners);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(listeners) = listeners.upgrade() {
                    listeners
                        .borrow_mut()
                        .retain(|item| !Rc::ptr_eq(item, &listener));
                }
            })),
        }
    }

    pub fn publish(&self, value: &T) {
        // snapshot so listeners may subscribe or unsubscribe while running
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            (listener)(value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl<T: 'static> Default for Topic<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle that unsubscribes on drop
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keep the listener registered for the topic's whole lifetime
    pub fn forget(mut self) {
        self.detach = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_publish_reaches_live_subscribers_only() {
        let topic: Topic<u32> = Topic::new();
        let seen = Rc::new(Cell::new(0));

        let sink = Rc::clone(&seen);
        let subscription = topic.subscribe(move |v| sink.set(sink.get() + v));
        topic.publish(&2);
        assert_eq!(seen.get(), 2);

        drop(subscription);
        topic.publish(&5);
        assert_eq!(seen.get(), 2);
        assert_eq!(topic.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_topic() {
        let topic: Topic<u32> = Topic::new();
        let subscription = topic.subscribe(|_| {});
        drop(topic);
        drop(subscription);
    }
}
