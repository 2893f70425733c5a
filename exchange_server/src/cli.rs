use std::env;

/// Non-secret settings that are safe to echo back. Tokens and keys are deliberately absent.
const DISPLAY_ENVS: [&str; 8] = [
    "RUST_LOG",
    "XG_HOST",
    "XG_PORT",
    "XG_DATABASE_URL",
    "XG_DATABASE_MAX_CONNECTIONS",
    "XG_CRYPTO_PAY_API_URL",
    "XG_WEBHOOK_SIGNATURE_CHECKS",
    "XG_TELEGRAM_API_URL",
];

/// The server is configured through the environment only. Any argument at all prints the help text and the current
/// settings. Returns true if the caller should exit.
pub fn handle_command_line_args() -> bool {
    if env::args().len() <= 1 {
        return false;
    }
    println!("\n{}\n", include_str!("./cli-help.txt"));
    println!("Current environment values (secrets are not shown):");
    for name in DISPLAY_ENVS {
        println!("  {name:<35} {}", describe_env(name));
    }
    true
}

fn describe_env(name: &str) -> String {
    match env::var_os(name) {
        None => "Not set".to_string(),
        Some(val) => match val.into_string() {
            Ok(s) => s,
            Err(raw) => format!("Invalid value: {}", raw.to_string_lossy()),
        },
    }
}
