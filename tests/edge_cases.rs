//! Edge case and boundary condition tests for the elevator bank

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use elevator_bank::{
    config::{BuildingConfig, Config, DispatchConfig, ElevatorConfig},
    console::ConsoleCommand,
    hal::{GatedPacer, InstantPacer, RecordingSink},
    Direction, DispatchError, Dispatcher, ElevatorEvent, ElevatorId, ElevatorState,
    InsertOutcome, Phase, Plan, PolicyKind, RejectReason,
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn instant_bank(config: Config) -> (Dispatcher, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let bank = Dispatcher::builder(config)
        .with_sink(sink.clone())
        .with_pacer(InstantPacer::new())
        .start()
        .unwrap();
    (bank, sink)
}

fn all_idle(bank: &Dispatcher) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if bank
            .status()
            .iter()
            .all(|s| s.pending() == 0 && s.phase == Phase::Idle)
        {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}

// ============================================================================
// Boundary Value Tests
// ============================================================================

#[test]
fn lowest_and_highest_floor_accepted() {
    let (bank, sink) = instant_bank(Config::default());
    bank.request_floor(Some(ElevatorId(0)), 10).unwrap();
    bank.request_floor(Some(ElevatorId(1)), 0).unwrap();

    assert!(sink.wait_for(
        |e| matches!(e, ElevatorEvent::DoorOpened { floor: 10, .. }),
        TIMEOUT
    ));
    assert!(sink.wait_for(
        |e| matches!(e, ElevatorEvent::DoorOpened { floor: 0, .. }),
        TIMEOUT
    ));
}

#[test]
fn just_outside_range_rejected() {
    let (bank, sink) = instant_bank(Config::default());
    for floor in [-1, 11, i32::MIN, i32::MAX] {
        assert_eq!(
            bank.request_floor(None, floor),
            Err(DispatchError::InvalidFloor {
                floor,
                max_floor: 10
            })
        );
    }
    assert_eq!(
        sink.count(|e| matches!(
            e,
            ElevatorEvent::Rejected {
                elevator: None,
                reason: RejectReason::InvalidFloor,
                ..
            }
        )),
        4
    );
    assert!(bank.status().iter().all(|s| s.pending() == 0));
}

#[test]
fn single_floor_building() {
    let config =
        Config::default().with_building(BuildingConfig::default().with_max_floor(0));
    let (bank, sink) = instant_bank(config);

    let assignment = bank.request_floor(None, 0).unwrap();
    assert_eq!(assignment.outcome, InsertOutcome::ServingNow);
    assert!(sink.wait_for(
        |e| matches!(e, ElevatorEvent::DoorOpened { floor: 0, .. }),
        TIMEOUT
    ));
    assert!(bank.request_floor(None, 1).is_err());
}

#[test]
fn exchange_out_of_range_registers_nothing() {
    let (bank, _sink) = instant_bank(Config::default());
    assert_eq!(
        bank.exchange(ElevatorId(0), 12, 3, 0).unwrap_err().reason(),
        RejectReason::InvalidFloor
    );
    assert_eq!(bank.snapshot(ElevatorId(0)).unwrap().pending(), 0);
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn duplicate_request_while_travelling_is_noop() {
    let gate = Arc::new(GatedPacer::new());
    let bank = Dispatcher::builder(Config::default())
        .with_sink(RecordingSink::new())
        .with_pacer(gate.clone())
        .start()
        .unwrap();

    assert_eq!(
        bank.request_floor(Some(ElevatorId(0)), 5).unwrap().outcome,
        InsertOutcome::Queued(Direction::Up)
    );
    assert!(gate.wait_for_waiting(1, TIMEOUT));
    assert_eq!(
        bank.request_floor(Some(ElevatorId(0)), 5).unwrap().outcome,
        InsertOutcome::AlreadyQueued(Direction::Up)
    );
    assert_eq!(bank.snapshot(ElevatorId(0)).unwrap().pending_up, vec![5]);
    gate.open();
}

// ============================================================================
// Current Floor Requests
// ============================================================================

#[test]
fn request_for_floor_being_left_is_served_on_return() {
    let sink = Arc::new(RecordingSink::new());
    let gate = Arc::new(GatedPacer::new());
    let bank = Dispatcher::builder(Config::default())
        .with_sink(sink.clone())
        .with_pacer(gate.clone())
        .start()
        .unwrap();

    bank.request_floor(Some(ElevatorId(0)), 4).unwrap();
    assert!(gate.wait_for_waiting(1, TIMEOUT));

    // Car 0 is at floor 1, moving up.
    assert_eq!(
        bank.request_floor(Some(ElevatorId(0)), 1).unwrap().outcome,
        InsertOutcome::Queued(Direction::Down)
    );
    gate.open();

    assert!(sink.wait_for(
        |e| matches!(e, ElevatorEvent::DoorOpened { floor: 1, .. }),
        TIMEOUT
    ));
    let doors: Vec<i32> = sink
        .events_for(ElevatorId(0))
        .into_iter()
        .filter_map(|e| match e {
            ElevatorEvent::DoorOpened { floor, .. } => Some(floor),
            _ => None,
        })
        .collect();
    assert_eq!(doors, vec![4, 1]);
}

// ============================================================================
// Scan Order
// ============================================================================

#[test]
fn reversal_serves_descending_after_top_stop() {
    // Up [3,5,7] served on the way up, then Down [2,1] after reversing at 7.
    let mut state = ElevatorState::new(ElevatorId(0), 10, 5);
    for floor in [3, 5, 7] {
        state.enqueue(floor).unwrap();
    }

    let mut served = Vec::new();
    let mut queued_down = false;
    while let plan @ (Plan::Move(_) | Plan::Serve(_)) = state.plan() {
        match plan {
            Plan::Move(direction) => {
                state.advance(direction);
            }
            Plan::Serve(floor) => {
                state.open_doors(floor);
                state.close_doors();
                served.push(floor);
            }
            Plan::Idle => unreachable!(),
        }
        if state.current_floor() == 7 && !queued_down {
            state.enqueue(2).unwrap();
            state.enqueue(1).unwrap();
            queued_down = true;
        }
    }
    assert_eq!(served, vec![3, 5, 7, 2, 1]);
    assert_eq!(state.direction(), Direction::Down);
}

// ============================================================================
// Capacity
// ============================================================================

#[test]
fn occupancy_never_exceeds_capacity_under_load() {
    let config = Config::default().with_elevator(ElevatorConfig::default().with_capacity(2));
    let (bank, sink) = instant_bank(config);

    for floor in 1..=6 {
        bank.exchange(ElevatorId(0), floor, 3, 1).unwrap();
    }
    assert!(all_idle(&bank));

    for event in sink.events() {
        if let ElevatorEvent::DoorOpened { occupancy, .. } = event {
            assert!(occupancy <= 2);
        }
    }
    assert!(sink.count(|e| matches!(
        e,
        ElevatorEvent::Rejected {
            reason: RejectReason::CapacityExceeded,
            ..
        }
    )) > 0);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn concurrent_callers_all_get_served() {
    let sink = Arc::new(RecordingSink::new());
    let bank = Arc::new(
        Dispatcher::builder(
            Config::default()
                .with_dispatch(DispatchConfig::default().with_policy(PolicyKind::DirectionAware)),
        )
        .with_sink(sink.clone())
        .with_pacer(InstantPacer::new())
        .start()
        .unwrap(),
    );

    let callers: Vec<_> = (0..4)
        .map(|t| {
            let bank = Arc::clone(&bank);
            thread::spawn(move || {
                for i in 0..25 {
                    let floor = (i * 7 + t) % 11;
                    bank.request_floor(None, floor).unwrap();
                }
            })
        })
        .collect();
    for caller in callers {
        caller.join().unwrap();
    }

    assert!(all_idle(&bank));
    for floor in 0..=10 {
        assert!(
            sink.count(|e| matches!(e, ElevatorEvent::DoorOpened { floor: f, .. } if *f == floor))
                > 0,
            "floor {} never served",
            floor
        );
    }
    let report = bank.shutdown();
    assert_eq!(report.total_abandoned(), 0);
}

#[test]
fn status_is_available_while_cars_are_held() {
    let gate = Arc::new(GatedPacer::new());
    let bank = Dispatcher::builder(Config::default())
        .with_sink(RecordingSink::new())
        .with_pacer(gate.clone())
        .start()
        .unwrap();

    bank.request_floor(Some(ElevatorId(0)), 9).unwrap();
    bank.request_floor(Some(ElevatorId(2)), 4).unwrap();
    assert!(gate.wait_for_waiting(2, TIMEOUT));

    let status = bank.status();
    assert_eq!(status[0].phase, Phase::Moving(Direction::Up));
    assert_eq!(status[1].phase, Phase::Idle);
    assert_eq!(status[2].current_floor, 1);
    gate.open();
}

// ============================================================================
// Console Round Trip
// ============================================================================

#[test]
fn console_commands_drive_the_bank() {
    let (bank, sink) = instant_bank(Config::default());

    match ConsoleCommand::from_text("andar 6").unwrap() {
        ConsoleCommand::Call { floor } => {
            bank.request_floor(None, floor).unwrap();
        }
        other => panic!("unexpected {:?}", other),
    }
    match ConsoleCommand::from_text("2 3").unwrap() {
        ConsoleCommand::Direct { elevator, floor } => {
            assert_eq!(bank.request_floor(Some(elevator), floor).unwrap().elevator, ElevatorId(2));
        }
        other => panic!("unexpected {:?}", other),
    }

    assert!(sink.wait_for(
        |e| matches!(e, ElevatorEvent::DoorOpened { floor: 6, .. }),
        TIMEOUT
    ));
    assert!(sink.wait_for(
        |e| matches!(
            e,
            ElevatorEvent::DoorOpened {
                elevator: ElevatorId(2),
                floor: 3,
                ..
            }
        ),
        TIMEOUT
    ));
}
