use fixcheck_core::{Action, BranchState, BranchStateRecord, Disposition};

/// Companion tool the automatable instruction names; it takes reference
/// ids and a target patch and rewrites the patch in place.
const REF_ADDER: &str = "fixref";

/// One-line state echo for verbose evaluation output.
pub fn describe_record(record: &BranchStateRecord) -> String {
    let state = match &record.state {
        BranchState::Nope => "nope".to_string(),
        BranchState::Ok => "ok".to_string(),
        BranchState::MissingReferences(refs) => {
            format!("missing_references ({})", join(refs.iter()))
        }
        BranchState::MissingPatch(intros) => {
            format!("missing_patch ({})", join(intros.iter()))
        }
        BranchState::MaybeMissingPatch => "maybe_missing_patch".to_string(),
    };
    format!("{}: {state}", record.branch)
}

/// The instruction line for one action. `None` for no-op dispositions;
/// the caller decides whether verbose mode shows those.
pub fn action_line(action: &Action) -> Option<String> {
    match &action.disposition {
        Disposition::Nothing => None,
        Disposition::ManualBackport(intros) => Some(format!(
            "MANUAL: {} needs backport of {} (fixes {})",
            action.branch,
            action.sha,
            join(intros.iter())
        )),
        Disposition::ManualReview => Some(format!(
            "MANUAL: {} may need backport of {}; no Fixes: tag known, review manually",
            action.branch, action.sha
        )),
        Disposition::RunReferenceAdder { patch, refs } => Some(format!(
            "RUN: {REF_ADDER} --branch {} --patch {} {}",
            action.branch,
            patch,
            join(refs.iter())
        )),
        Disposition::ManualReferences(refs) => Some(format!(
            "MANUAL: add references to the backport of {} in {}: {}",
            action.sha,
            action.branch,
            join(refs.iter())
        )),
    }
}

fn join<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(" ")
}

/// Prints surviving actions, emitting the one-time "action needed" banner
/// before the first mandatory one.
pub struct ActionPrinter {
    verbose: bool,
    banner_printed: bool,
}

impl ActionPrinter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose, banner_printed: false }
    }

    pub fn print(&mut self, action: &Action) {
        match action_line(action) {
            Some(line) => {
                if !self.banner_printed {
                    println!("action needed");
                    self.banner_printed = true;
                }
                println!("{line}");
            }
            None => {
                if self.verbose {
                    println!("{}: nothing to do", action.branch);
                }
            }
        }
    }

    pub fn any_action_printed(&self) -> bool {
        self.banner_printed
    }
}
