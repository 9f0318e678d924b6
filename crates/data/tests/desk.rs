use prizedraw_core::{is_triple, DrawConfig, DrawEngine, PrizePool, PrizeTier, RngState};
use prizedraw_data::{
    DeskError, DrawDesk, EligibilityError, JsonRosterStore, Participant, RecordStore, Roster,
    RosterError,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

struct MemoryStore {
    initial: Roster,
    saved: Mutex<Vec<Roster>>,
    fail_saves: bool,
}

impl MemoryStore {
    fn new(initial: Roster) -> Self {
        Self {
            initial,
            saved: Mutex::new(Vec::new()),
            fail_saves: false,
        }
    }

    fn failing(initial: Roster) -> Self {
        Self {
            fail_saves: true,
            ..Self::new(initial)
        }
    }

    fn saves(&self) -> usize {
        self.saved.lock().expect("saved").len()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> Result<Roster, RosterError> {
        Ok(self.initial.clone())
    }

    fn save(&self, roster: &Roster) -> Result<(), RosterError> {
        if self.fail_saves {
            return Err(RosterError::Io("disk full".to_string()));
        }
        self.saved.lock().expect("saved").push(roster.clone());
        Ok(())
    }
}

fn roster(count: usize) -> Roster {
    Roster::new(
        (1..=count)
            .map(|idx| Participant::new(idx.to_string(), format!("guest{idx}")))
            .collect(),
    )
}

fn engine(prizes: Vec<u32>, seed: u64) -> DrawEngine {
    DrawEngine::with_pool(
        PrizePool::from_values(prizes),
        vec![10, 20, 30, 50, 100, 200, 300],
        RngState::from_seed(seed),
    )
    .expect("engine")
}

#[test]
fn spin_rejects_ineligible_requests_without_drawing() {
    let desk = DrawDesk::open(engine(vec![100], 1), MemoryStore::new(roster(2))).expect("open");
    assert!(matches!(
        desk.spin("", "guest1"),
        Err(DeskError::Ineligible(EligibilityError::MissingFields))
    ));
    assert!(matches!(
        desk.spin("1", "guest2"),
        Err(DeskError::Ineligible(EligibilityError::IdNameMismatch))
    ));
    assert_eq!(desk.engine().remaining(), 1);

    desk.spin("1", "guest1").expect("first draw");
    assert_eq!(desk.check("1", "guest1"), Err(EligibilityError::AlreadyUsed));
    assert!(matches!(
        desk.spin("1", "guest1"),
        Err(DeskError::Ineligible(EligibilityError::AlreadyUsed))
    ));
}

#[test]
fn last_participant_takes_the_last_prize() {
    let store = MemoryStore::new(roster(1));
    let desk = DrawDesk::open(engine(vec![300], 2), store).expect("open");
    let outcome = desk.spin("1", "guest1").expect("spin");
    assert_eq!(outcome.prize(), Some(300));
    assert_eq!(outcome.slots(), [300, 300, 300]);
    let status = desk.status();
    assert_eq!(status.drawn, 1);
    assert_eq!(status.remaining_eligible, 0);
    assert_eq!(status.pool.remaining, 0);
}

#[test]
fn failed_save_keeps_the_prize_spent() {
    let desk =
        DrawDesk::open(engine(vec![50, 50], 3), MemoryStore::failing(roster(2))).expect("open");
    let outcome = desk.spin("2", "guest2").expect("spin");
    assert!(outcome.is_win());
    assert_eq!(desk.engine().remaining(), 1);
    assert_eq!(desk.check("2", "guest2"), Err(EligibilityError::AlreadyUsed));
}

#[test]
fn every_spin_is_saved() {
    let desk = DrawDesk::open(engine(vec![10], 4), MemoryStore::new(roster(3))).expect("open");
    for idx in 1..=3 {
        desk.spin(&idx.to_string(), &format!("guest{idx}"))
            .expect("spin");
    }
    assert_eq!(desk.store().saves(), 3);
    let status = desk.status();
    assert_eq!(status.remaining_eligible, 0);
    assert_eq!(status.pool.remaining, 0);
}

#[test]
fn concurrent_spins_award_the_whole_pool() {
    let config = DrawConfig {
        prizes: vec![
            PrizeTier { value: 300, count: 3 },
            PrizeTier { value: 100, count: 7 },
            PrizeTier { value: 10, count: 20 },
        ],
        display_numbers: vec![10, 100, 300],
    };
    let participants = 80;
    let store = MemoryStore::new(roster(participants));
    let engine = DrawEngine::new(&config, RngState::from_seed(5)).expect("engine");
    let desk = Arc::new(DrawDesk::open(engine, store).expect("open"));

    let handles: Vec<_> = (1..=participants)
        .map(|idx| {
            let desk = Arc::clone(&desk);
            thread::spawn(move || desk.spin(&idx.to_string(), &format!("guest{idx}")))
        })
        .collect();

    let mut wins: HashMap<u32, u32> = HashMap::new();
    for handle in handles {
        let outcome = handle.join().expect("join").expect("spin");
        match outcome.prize() {
            Some(prize) => *wins.entry(prize).or_insert(0) += 1,
            None => assert!(!is_triple(&outcome.slots())),
        }
    }
    assert_eq!(wins.get(&300), Some(&3));
    assert_eq!(wins.get(&100), Some(&7));
    assert_eq!(wins.get(&10), Some(&20));
    assert_eq!(desk.status().pool.remaining, 0);
}

#[test]
fn reopening_retires_recorded_prizes() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time")
        .as_nanos();
    let path: PathBuf = std::env::temp_dir().join(format!(
        "prizedraw_desk_test_{}_{}.json",
        std::process::id(),
        nanos
    ));
    let store = JsonRosterStore::new(&path);
    store.save(&roster(4)).expect("seed roster");

    {
        let desk = DrawDesk::open(engine(vec![200, 200], 6), JsonRosterStore::new(&path))
            .expect("open");
        desk.spin("1", "guest1").expect("spin");
        desk.spin("2", "guest2").expect("spin");
    }

    let saved = store.load().expect("reload");
    let awarded = saved.awarded().len();
    assert_eq!(saved.drawn(), 2);

    let desk =
        DrawDesk::open(engine(vec![200, 200], 7), JsonRosterStore::new(&path)).expect("reopen");
    assert_eq!(desk.engine().remaining(), 2 - awarded);
    let _ = std::fs::remove_file(path);
}
