//! Behavioural tests for identifier allocation, name projection and
//! spatial cleaning.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use stopdelta_data::{CleanReport, IdentifierAllocator, SpatialDeduplicator, write_names};

mod support;

use support::Workspace;

const LEDGER: &str = "delta/coordinates";
const NAMES: &str = "delta/names";

struct DeltaWorld {
    workspace: Workspace,
    clean: Option<CleanReport>,
}

impl DeltaWorld {
    fn ledger(&self) -> Utf8PathBuf {
        self.workspace.path(LEDGER)
    }

    fn names(&self) -> Utf8PathBuf {
        self.workspace.path(NAMES)
    }

    fn clean_with(&mut self, threshold_metres: f64) {
        let report = SpatialDeduplicator::new("flixtrain", threshold_metres)
            .clean(&self.ledger())
            .expect("cleaning succeeds");
        self.clean = Some(report);
    }

    fn survivors(&self) -> usize {
        self.clean.as_ref().expect("ledger was cleaned").kept
    }
}

#[fixture]
fn delta_world() -> RefCell<DeltaWorld> {
    RefCell::new(DeltaWorld {
        workspace: Workspace::new(),
        clean: None,
    })
}

#[given("a ledger with one unidentified TestCo stop")]
fn unidentified_ledger(#[from(delta_world)] world: &RefCell<DeltaWorld>) {
    world
        .borrow()
        .workspace
        .write(LEDGER, "  12.345600  47.123400    % TestStop [TestCo]\n");
}

#[given("a ledger with two stops 55 metres apart")]
fn nearby_ledger(#[from(delta_world)] world: &RefCell<DeltaWorld>) {
    world.borrow().workspace.write(
        LEDGER,
        "   8.000000  47.000000    % Zurich A [Flixbus]\n\
         \u{20}  8.000000  47.000500    % Zurich B [BlaBlaCar]\n",
    );
}

#[when("identifiers are assigned from the default floor")]
fn assign_ids(#[from(delta_world)] world: &RefCell<DeltaWorld>) {
    let ledger = world.borrow().ledger();
    IdentifierAllocator::default()
        .assign_ids(&ledger, &HashSet::new())
        .expect("allocation succeeds");
}

#[when("the TestCo names are written")]
fn names_written(#[from(delta_world)] world: &RefCell<DeltaWorld>) {
    let world = world.borrow();
    write_names(&world.ledger(), "TestCo", &world.names()).expect("names are written");
}

#[when("the ledger is cleaned with a threshold of 100 metres")]
fn clean_at_100(#[from(delta_world)] world: &RefCell<DeltaWorld>) {
    world.borrow_mut().clean_with(100.0);
}

#[when("the ledger is cleaned with a threshold of 10 metres")]
fn clean_at_10(#[from(delta_world)] world: &RefCell<DeltaWorld>) {
    world.borrow_mut().clean_with(10.0);
}

#[then("the ledger line carries identifier 1700000")]
fn ledger_identified(#[from(delta_world)] world: &RefCell<DeltaWorld>) {
    let world = world.borrow();
    assert_eq!(
        world.workspace.lines(&world.ledger()),
        ["1700000   12.345600  47.123400         % TestStop [TestCo]"]
    );
}

#[then("the name index lists TestStop under 1700000")]
fn name_index_lists_stop(#[from(delta_world)] world: &RefCell<DeltaWorld>) {
    let world = world.borrow();
    assert_eq!(
        world.workspace.lines(&world.names()),
        ["1700000      TestStop$<1>"]
    );
}

#[then("one stop survives")]
fn one_survivor(#[from(delta_world)] world: &RefCell<DeltaWorld>) {
    let world = world.borrow();
    assert_eq!(world.survivors(), 1);
    let report = world.clean.as_ref().expect("ledger was cleaned");
    assert_eq!(report.removed_near.len(), 1);
    assert_eq!(report.removed_near[0].kept_name, "Zurich A");
    assert_eq!(world.workspace.lines(&world.ledger()).len(), 1);
}

#[then("both stops survive")]
fn both_survive(#[from(delta_world)] world: &RefCell<DeltaWorld>) {
    let world = world.borrow();
    assert_eq!(world.survivors(), 2);
    assert_eq!(world.workspace.lines(&world.ledger()).len(), 2);
}

#[test]
fn scenario_indices_follow_feature_order() {
    let feature =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/features/station_delta.feature");
    let contents = fs::read_to_string(&feature).unwrap_or_else(|err| {
        panic!("failed to read feature file {feature:?}: {err}");
    });
    let titles: Vec<&str> = contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Scenario: "))
        .collect();
    assert_eq!(
        titles,
        [
            "identifying a new stop",
            "collapsing nearby stops at 100 metres",
            "keeping nearby stops at 10 metres",
        ],
        "scenario order changed in feature file"
    );
}

#[scenario(path = "tests/features/station_delta.feature", index = 0)]
fn identifying_a_new_stop(delta_world: RefCell<DeltaWorld>) {
    let _ = delta_world;
}

#[scenario(path = "tests/features/station_delta.feature", index = 1)]
fn collapsing_nearby_stops(delta_world: RefCell<DeltaWorld>) {
    let _ = delta_world;
}

#[scenario(path = "tests/features/station_delta.feature", index = 2)]
fn keeping_nearby_stops(delta_world: RefCell<DeltaWorld>) {
    let _ = delta_world;
}
