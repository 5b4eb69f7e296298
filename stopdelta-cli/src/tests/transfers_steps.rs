//! Behaviour-driven step definitions driving the transfers CLI scenarios.

use super::helpers::CliWorkspace;
use super::*;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

struct TransfersWorld {
    workspace: CliWorkspace,
    stdout: RefCell<Vec<u8>>,
}

impl TransfersWorld {
    fn run(&self, extra: &[String]) {
        let mut argv = vec![
            "stopdelta".to_owned(),
            "transfers".to_owned(),
            format!("--{ARG_DELTA_DIR}"),
            self.workspace.delta_dir().into_string(),
        ];
        argv.extend(extra.iter().cloned());
        let cli = Cli::try_parse_from(argv).expect("arguments should parse");
        let Command::Transfers(args) = cli.command else {
            panic!("expected transfers command");
        };
        let mut stdout = self.stdout.borrow_mut();
        stdout.clear();
        run_transfers_command(args, &mut *stdout).expect("transfers command succeeds");
    }

    fn stdout(&self) -> String {
        String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8")
    }
}

#[fixture]
fn world() -> TransfersWorld {
    TransfersWorld {
        workspace: CliWorkspace::new(),
        stdout: RefCell::new(Vec::new()),
    }
}

#[given("a name index on disk")]
fn name_index(#[from(world)] world: &TransfersWorld) {
    world
        .workspace
        .write("delta/names", "1700005      Bern Wankdorf$<1>\n");
}

#[given("a relation export with one pair")]
fn relation_export(#[from(world)] world: &TransfersWorld) {
    world.workspace.write(
        "downloads/relations.txt",
        "\"final_line\"\n\"1700005 8500010 002\"\n",
    );
}

#[given("a relation table with one pair and no reciprocal line")]
fn incomplete_table(#[from(world)] world: &TransfersWorld) {
    world
        .workspace
        .write("delta/relations", "1700005 8500010 002\n");
}

#[when("I run the transfers command on the export")]
fn run_on_export(#[from(world)] world: &TransfersWorld) {
    let export = world.workspace.path("downloads/relations.txt");
    world.run(&[export.into_string()]);
    let stdout = world.stdout();
    assert!(
        stdout.contains("Relations: 1 pairs, 1 reciprocal lines added"),
        "unexpected summary:\n{stdout}"
    );
    assert!(
        stdout.contains("Interchange: 1 records"),
        "unexpected summary:\n{stdout}"
    );
}

#[when("I run the transfers check")]
fn run_check(#[from(world)] world: &TransfersWorld) {
    world.run(&[format!("--{ARG_CHECK}")]);
}

#[then("the relation table is reported complete by the check")]
fn table_complete(#[from(world)] world: &TransfersWorld) {
    world.run(&[format!("--{ARG_CHECK}")]);
    let stdout = world.stdout();
    assert!(stdout.ends_with("is complete\n"), "unexpected output:\n{stdout}");
    let interchange = std::fs::read_to_string(world.workspace.path("delta/interchange"))
        .expect("interchange table written");
    assert_eq!(interchange, "1700005 02 02 Bern Wankdorf\n");
}

#[then("the check reports an incomplete relation table")]
fn table_incomplete(#[from(world)] world: &TransfersWorld) {
    let stdout = world.stdout();
    assert!(stdout.ends_with("is incomplete\n"), "unexpected output:\n{stdout}");
}

#[scenario(path = "tests/features/transfers_command.feature", name = "completing a relation export")]
fn transfers_complete_export(#[from(world)] world: TransfersWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/transfers_command.feature",
    name = "checking an incomplete relation table"
)]
fn transfers_check_incomplete(#[from(world)] world: TransfersWorld) {
    let _ = world;
}
