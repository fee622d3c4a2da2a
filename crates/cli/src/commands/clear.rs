use super::{load_config, open_ledger, CommandResult};

pub fn run(confirmed: bool) -> CommandResult {
    if !confirmed {
        return CommandResult::failure(
            "this wipes every product and the persisted snapshot; re-run with --yes to confirm",
            1,
        );
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let ledger = open_ledger(&config);

    match ledger.clear_all() {
        Ok(()) => CommandResult::success("all products cleared"),
        Err(error) => CommandResult::failure(error.user_message(), 3),
    }
}
