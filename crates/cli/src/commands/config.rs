use super::{load_config, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let relay_token = if config.relay.token.is_some() { "[redacted]" } else { "(unset)" };
    let relay_endpoint = config.relay.endpoint.as_deref().unwrap_or("(unset)");

    let output = format!(
        "store.data_dir               = {}\n\
         store.snapshot_key           = {}\n\
         ledger.require_name_on_create = {}\n\
         relay.enabled                = {}\n\
         relay.endpoint               = {}\n\
         relay.token                  = {}\n\
         relay.timeout_secs           = {}\n\
         server.bind_address          = {}\n\
         server.port                  = {}\n\
         logging.level                = {}\n\
         logging.format               = {:?}",
        config.store.data_dir.display(),
        config.store.snapshot_key,
        config.ledger.require_name_on_create,
        config.relay.enabled,
        relay_endpoint,
        relay_token,
        config.relay.timeout_secs,
        config.server.bind_address,
        config.server.port,
        config.logging.level,
        config.logging.format,
    );

    CommandResult::success(output)
}
