//! Three-counter multicast walkthrough
//!
//! Registers three delegates that each increment their own counter, then
//! shows how unregistration changes the next dispatch.
//!
//! Usage:
//!   cargo run --example counters
//!
//! Set RUST_LOG=trace to watch the event's internal bookkeeping.

use std::cell::Cell;

use delegate_event::{Delegate, Event};

struct Counter {
    name: &'static str,
    value: Cell<u32>,
}

impl Counter {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            value: Cell::new(0),
        }
    }

    fn increment(&self, _args: ()) {
        self.value.set(self.value.get() + 1);
    }
}

fn print_counters(counters: &[&Counter]) {
    for counter in counters {
        println!("  {} = {}", counter.name, counter.value.get());
    }
}

fn main() {
    env_logger::init();

    let a = Counter::new("cA");
    let b = Counter::new("cB");
    let c = Counter::new("cC");

    let event = Event::new();
    let on_b = unsafe { Delegate::from_const_method(&b, Counter::increment) };
    event.register(unsafe { Delegate::from_const_method(&a, Counter::increment) });
    event.register(on_b);
    event.register(unsafe { Delegate::from_const_method(&c, Counter::increment) });

    println!("=== First dispatch (all three registered) ===");
    event.emit(());
    print_counters(&[&a, &b, &c]);

    println!("\n=== Second dispatch (cB unregistered) ===");
    event.unregister(&on_b);
    event.emit(());
    print_counters(&[&a, &b, &c]);

    println!("\n=== After clear, dispatch reaches nothing ===");
    event.clear();
    event.emit(());
    print_counters(&[&a, &b, &c]);
}
