//! Behaviour-driven step definitions driving the delta CLI scenarios.

use super::helpers::{CliWorkspace, FLIXBUS_FEED, REFERENCE_BASELINE};
use super::*;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

struct DeltaWorld {
    workspace: CliWorkspace,
    include_providers: RefCell<bool>,
    outputs: RefCell<Vec<String>>,
    results: RefCell<Vec<Result<(), CliError>>>,
}

impl DeltaWorld {
    fn new() -> Self {
        Self {
            workspace: CliWorkspace::new(),
            include_providers: RefCell::new(true),
            outputs: RefCell::new(Vec::new()),
            results: RefCell::new(Vec::new()),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec![
            "stopdelta".to_owned(),
            "delta".to_owned(),
            format!("--{ARG_RAW_DIR}"),
            self.workspace.raw_dir().into_string(),
            format!("--{ARG_DELTA_DIR}"),
            self.workspace.delta_dir().into_string(),
        ];
        if *self.include_providers.borrow() {
            argv.push(format!("--{ARG_PROVIDERS}"));
            argv.push(format!("Flixbus={}", self.workspace.path("downloads/flixbus.txt")));
        }
        argv
    }

    fn run(&self) {
        let mut buffer = Vec::new();
        let outcome = Cli::try_parse_from(self.build_command_line())
            .map_err(CliError::from)
            .and_then(|cli| match cli.command {
                Command::Delta(args) => run_delta_command(args, &mut buffer),
                Command::Transfers(_) => panic!("expected delta command"),
            });
        self.outputs
            .borrow_mut()
            .push(String::from_utf8(buffer).expect("stdout utf-8"));
        self.results.borrow_mut().push(outcome);
    }

    fn last_error<R>(&self, check: impl FnOnce(&CliError) -> R) -> R {
        let results = self.results.borrow();
        let error = results
            .last()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error");
        check(error)
    }
}

#[fixture]
fn world() -> DeltaWorld {
    DeltaWorld::new()
}

#[given("a reference baseline on disk")]
fn reference_baseline(#[from(world)] world: &DeltaWorld) {
    world
        .workspace
        .write("raw/reference_coordinates", REFERENCE_BASELINE);
}

#[given("a provider feed with a stop missing from the reference")]
fn provider_feed(#[from(world)] world: &DeltaWorld) {
    world.workspace.write("downloads/flixbus.txt", FLIXBUS_FEED);
}

#[when("I run the delta command")]
fn run_delta(#[from(world)] world: &DeltaWorld) {
    world.run();
}

#[when("I run the delta command again")]
fn run_delta_again(#[from(world)] world: &DeltaWorld) {
    world.run();
}

#[when("I run the delta command without providers")]
fn run_delta_without_providers(#[from(world)] world: &DeltaWorld) {
    *world.include_providers.borrow_mut() = false;
    world.run();
}

#[then("the command succeeds and reports one appended stop")]
fn command_succeeds(#[from(world)] world: &DeltaWorld) {
    let results = world.results.borrow();
    results
        .last()
        .expect("result recorded")
        .as_ref()
        .expect("expected success");
    let outputs = world.outputs.borrow();
    let stdout = outputs.last().expect("output recorded");
    assert!(
        stdout.contains("Flixbus: 1 appended, 1 in reference, 0 already in ledger"),
        "unexpected summary:\n{stdout}"
    );
    assert!(
        stdout.contains("Identifiers: 1 assigned, 0 retained"),
        "unexpected summary:\n{stdout}"
    );
}

#[then("the name index lists the new stop")]
fn name_index_lists_stop(#[from(world)] world: &DeltaWorld) {
    let names = std::fs::read_to_string(world.workspace.path("delta/names"))
        .expect("name index written");
    let lines: Vec<&str> = names.lines().collect();
    assert_eq!(lines.len(), 1, "unexpected name index:\n{names}");
    assert!(lines[0].starts_with("1700000 "), "unexpected line {:?}", lines[0]);
    assert!(lines[0].contains("Bern"), "unexpected line {:?}", lines[0]);
}

#[then("the second run reports that nothing changed")]
fn second_run_unchanged(#[from(world)] world: &DeltaWorld) {
    let results = world.results.borrow();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(Result::is_ok), "runs failed: {results:?}");
    let outputs = world.outputs.borrow();
    assert_eq!(outputs[1], "No provider feed changed; nothing to do\n");
}

#[then("the command fails because the providers are missing")]
fn command_fails_missing_providers(#[from(world)] world: &DeltaWorld) {
    world.last_error(|error| match error {
        CliError::MissingArgument { field, env } => {
            assert_eq!(*field, ARG_PROVIDERS);
            assert_eq!(*env, ENV_PROVIDERS);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    });
}

#[then("the command fails because the reference baseline is missing")]
fn command_fails_missing_reference(#[from(world)] world: &DeltaWorld) {
    world.last_error(|error| match error {
        CliError::MissingSourceFile { field, .. } => assert_eq!(*field, ARG_REFERENCE),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    });
}

macro_rules! register_delta_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/delta_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: DeltaWorld) {
            let _ = world;
        }
    };
}

register_delta_scenario!(delta_merges_new_feed, "merging a new provider feed");
register_delta_scenario!(delta_skips_unchanged_feed, "skipping an unchanged provider feed");
register_delta_scenario!(delta_missing_providers, "rejecting a missing provider list");
register_delta_scenario!(delta_missing_reference, "rejecting a missing reference baseline");
