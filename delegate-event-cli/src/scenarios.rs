//! Demo scenarios
//!
//! Each scenario exercises one slice of the delegate/event API and records
//! what happened in a [`ScenarioOutcome`]. The scenario table at the bottom
//! is itself a little dispatch exercise: plain function pointers selected by
//! name.

use std::cell::Cell;

use delegate_event::{Delegate, Event};

use crate::config::DemoConfig;
use crate::report::ScenarioOutcome;

/// Errors the demo driver can produce on its own
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("unknown scenario: {0} (use --list to see available names)")]
    UnknownScenario(String),

    #[error("rounds must be at least 1")]
    InvalidRounds,
}

/// A named demo scenario
pub struct Scenario {
    pub name: &'static str,
    pub summary: &'static str,
    run: fn(usize) -> ScenarioOutcome,
}

/// All available scenarios, in default execution order
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "functions",
        summary: "free-function delegates over several call signatures",
        run: functions,
    },
    Scenario {
        name: "methods",
        summary: "delegates bound to mutating and const methods",
        run: methods,
    },
    Scenario {
        name: "counters",
        summary: "three counters registered on one event, one removed mid-way",
        run: counters,
    },
    Scenario {
        name: "event-reset",
        summary: "reset empties an event so later dispatches reach nothing",
        run: event_reset,
    },
    Scenario {
        name: "reentrancy",
        summary: "delegates that unregister themselves or siblings mid-dispatch",
        run: reentrancy,
    },
];

/// Run the configured scenarios and collect their outcomes
pub fn run(plan: &DemoConfig) -> Result<Vec<ScenarioOutcome>, CliError> {
    if plan.rounds == 0 {
        return Err(CliError::InvalidRounds);
    }

    let selected: Vec<&Scenario> = if plan.scenarios.is_empty() {
        SCENARIOS.iter().collect()
    } else {
        plan.scenarios
            .iter()
            .map(|name| {
                SCENARIOS
                    .iter()
                    .find(|scenario| scenario.name == name)
                    .ok_or_else(|| CliError::UnknownScenario(name.clone()))
            })
            .collect::<Result<_, _>>()?
    };

    Ok(selected
        .iter()
        .map(|scenario| {
            log::info!("Running scenario: {}", scenario.name);
            (scenario.run)(plan.rounds)
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Scenario targets
// ---------------------------------------------------------------------------

fn describe(_args: ()) -> &'static str {
    "no arguments"
}

fn scale(args: (i32,)) -> i32 {
    args.0 * 10
}

fn add(args: (i32, i32)) -> i32 {
    args.0 + args.1
}

/// Holds values pushed through a mutating-method delegate.
struct Accumulator {
    values: Vec<i32>,
}

impl Accumulator {
    fn push(&mut self, args: (i32,)) {
        self.values.push(args.0);
    }

    fn total(&self, _args: ()) -> i32 {
        self.values.iter().sum()
    }
}

/// A counter bumped through a const-method delegate.
struct Counter {
    value: Cell<u32>,
}

impl Counter {
    fn new() -> Self {
        Self {
            value: Cell::new(0),
        }
    }

    fn increment(&self, _args: ()) {
        self.value.set(self.value.get() + 1);
    }
}

/// Unregisters its own delegate during its invocation.
struct SelfRemover<'e> {
    event: &'e Event<()>,
    me: Cell<Option<Delegate<()>>>,
    calls: Cell<u32>,
}

impl<'e> SelfRemover<'e> {
    fn fire(&self, _args: ()) {
        self.calls.set(self.calls.get() + 1);
        if let Some(me) = self.me.get() {
            self.event.unregister(&me);
        }
    }
}

/// Unregisters a sibling's delegate during its invocation.
struct Cutter<'e> {
    event: &'e Event<()>,
    victim: Cell<Option<Delegate<()>>>,
    calls: Cell<u32>,
}

impl<'e> Cutter<'e> {
    fn fire(&self, _args: ()) {
        self.calls.set(self.calls.get() + 1);
        if let Some(victim) = self.victim.take() {
            self.event.unregister(&victim);
        }
    }
}

// ---------------------------------------------------------------------------
// Scenario implementations
// ---------------------------------------------------------------------------

fn functions(rounds: usize) -> ScenarioOutcome {
    let mut outcome = ScenarioOutcome::new("functions");

    let no_args = Delegate::from_fn(describe);
    let one_arg = Delegate::from_fn(scale);
    let two_args = Delegate::from_fn(add);

    for round in 0..rounds {
        let round = round as i32;
        outcome.note(format!("describe() -> {:?}", no_args.call(())));
        outcome.note(format!("scale({}) -> {}", round, one_arg.call((round,))));
        outcome.note(format!(
            "add({}, 2) -> {}",
            round,
            two_args.call((round, 2))
        ));
        outcome.invocations += 3;
    }

    // Delegates are identity-comparable handles.
    assert_eq!(no_args, Delegate::from_fn(describe));
    outcome.note("separately constructed handles to one function compare equal");

    outcome
}

fn methods(rounds: usize) -> ScenarioOutcome {
    let mut outcome = ScenarioOutcome::new("methods");

    let mut accumulator = Accumulator { values: Vec::new() };
    let push = unsafe { Delegate::from_method(&mut accumulator, Accumulator::push) };
    for value in 1..=rounds {
        push.call((value as i32,));
        outcome.invocations += 1;
    }

    // The mutating delegate is done; switch to a const view of the instance.
    let total = unsafe { Delegate::from_const_method(&accumulator, Accumulator::total) };
    let sum = total.call(());
    outcome.invocations += 1;

    outcome.note(format!("pushed 1..={} through a method delegate", rounds));
    outcome.note(format!("total() via const-method delegate -> {}", sum));
    outcome.note(format!(
        "direct call agrees: {}",
        accumulator.values.iter().sum::<i32>()
    ));

    outcome
}

fn counters(rounds: usize) -> ScenarioOutcome {
    let mut outcome = ScenarioOutcome::new("counters");

    let a = Counter::new();
    let b = Counter::new();
    let c = Counter::new();

    let event = Event::new();
    let on_b = unsafe { Delegate::from_const_method(&b, Counter::increment) };
    event.register(unsafe { Delegate::from_const_method(&a, Counter::increment) });
    event.register(on_b);
    event.register(unsafe { Delegate::from_const_method(&c, Counter::increment) });

    for _ in 0..rounds {
        event.emit(());
        outcome.dispatches += 1;
        outcome.invocations += 3;
    }
    outcome.note(format!(
        "after {} dispatch(es): cA={} cB={} cC={}",
        rounds,
        a.value.get(),
        b.value.get(),
        c.value.get()
    ));

    event.unregister(&on_b);
    for _ in 0..rounds {
        event.emit(());
        outcome.dispatches += 1;
        outcome.invocations += 2;
    }
    outcome.note(format!(
        "cB unregistered; after {} more: cA={} cB={} cC={}",
        rounds,
        a.value.get(),
        b.value.get(),
        c.value.get()
    ));

    outcome
}

fn event_reset(rounds: usize) -> ScenarioOutcome {
    let mut outcome = ScenarioOutcome::new("event-reset");

    let counter = Counter::new();
    let event = Event::new();
    event.register(unsafe { Delegate::from_const_method(&counter, Counter::increment) });

    for _ in 0..rounds {
        event.emit(());
        outcome.dispatches += 1;
        outcome.invocations += 1;
    }
    outcome.note(format!("counter after {} dispatch(es): {}", rounds, counter.value.get()));

    event.reset();
    for _ in 0..rounds {
        event.emit(());
        outcome.dispatches += 1;
    }
    outcome.note(format!(
        "counter after reset and {} more dispatch(es): {} (unchanged)",
        rounds,
        counter.value.get()
    ));

    outcome
}

fn reentrancy(_rounds: usize) -> ScenarioOutcome {
    let mut outcome = ScenarioOutcome::new("reentrancy");

    // Part 1: a delegate removes itself mid-dispatch.
    {
        let event = Event::new();
        let first = Counter::new();
        let remover = SelfRemover {
            event: &event,
            me: Cell::new(None),
            calls: Cell::new(0),
        };
        let last = Counter::new();

        let on_remover = unsafe { Delegate::from_const_method(&remover, SelfRemover::fire) };
        remover.me.set(Some(on_remover));

        event.register(unsafe { Delegate::from_const_method(&first, Counter::increment) });
        event.register(on_remover);
        event.register(unsafe { Delegate::from_const_method(&last, Counter::increment) });

        event.emit(());
        event.emit(());
        outcome.dispatches += 2;
        outcome.invocations +=
            (first.value.get() + remover.calls.get() + last.value.get()) as usize;
        outcome.note(format!(
            "self-removal: neighbors ran {} + {} times, remover only {}",
            first.value.get(),
            last.value.get(),
            remover.calls.get()
        ));
    }

    // Part 2: a delegate removes a not-yet-visited sibling.
    {
        let event = Event::new();
        let cutter = Cutter {
            event: &event,
            victim: Cell::new(None),
            calls: Cell::new(0),
        };
        let middle = Counter::new();
        let victim = Counter::new();

        let on_victim = unsafe { Delegate::from_const_method(&victim, Counter::increment) };
        cutter.victim.set(Some(on_victim));

        event.register(unsafe { Delegate::from_const_method(&cutter, Cutter::fire) });
        event.register(unsafe { Delegate::from_const_method(&middle, Counter::increment) });
        event.register(on_victim);

        event.emit(());
        outcome.dispatches += 1;
        outcome.invocations += (cutter.calls.get() + middle.value.get() + victim.value.get()) as usize;
        outcome.note(format!(
            "sibling removal: cutter={} middle={} victim={} (victim never ran)",
            cutter.calls.get(),
            middle.value.get(),
            victim.value.get()
        ));
    }

    outcome
}
