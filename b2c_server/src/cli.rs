use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Consumer key and secret are deliberately absent
    const DISPLAY_ENVS: [&str; 12] = [
        "RUST_LOG",
        "B2C_HOST",
        "B2C_PORT",
        "B2C_DATABASE_URL",
        "B2C_REQUEST_RETENTION_HOURS",
        "B2C_PUBLISH_WEBHOOK_URL",
        "B2C_EVENT_BUFFER_SIZE",
        "B2C_ACCESS_TOKEN_URL",
        "B2C_TOKEN_REQUEST_TIMEOUT_SECS",
        "B2C_TOKEN_REFRESH_INTERVAL_SECS",
        "B2C_TOKEN_BACKOFF_SECS",
        "B2C_TOKEN_BACKOFF_CEILING_SECS",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
