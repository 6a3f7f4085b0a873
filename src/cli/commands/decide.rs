use clap::Args;
use serde_json::json;

use crate::access::matcher::RouteMatcher;
use crate::access::{Action, AuthState};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Args, Debug)]
pub struct DecideArgs {
    #[arg(help = "Request path, e.g. /dashboard/settings")]
    pub path: String,

    #[arg(long, help = "The request carries a session")]
    pub session: bool,

    #[arg(long, help = "Verification flag of the session's user (omit for unknown)")]
    pub verified: Option<bool>,
}

/// Evaluate a path the way the server's access gate does. `None` means the
/// path is outside the matcher and reaches its handler without a decision.
pub fn evaluate(matcher: &RouteMatcher, state: AuthState, path: &str) -> Option<Action> {
    matcher.matches(path).then(|| state.decide(path))
}

pub fn handle(args: DecideArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let matcher = config::config().route_matcher()?;
    let state = AuthState::from_flags(args.session, args.verified);
    let action = evaluate(&matcher, state, &args.path);

    match output_format {
        OutputFormat::Json => {
            let decision = match &action {
                Some(action) => serde_json::to_value(action)?,
                None => json!({ "action": "bypass" }),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "path": args.path,
                    "state": state,
                    "decision": decision,
                }))?
            );
        }
        OutputFormat::Text => match action {
            None => println!("{} ({:?}): bypass (not gated)", args.path, state),
            Some(Action::Continue) => println!("{} ({:?}): continue", args.path, state),
            Some(Action::RedirectTo(target)) => println!("{} ({:?}): redirect to {}", args.path, state, target),
        },
    }
    Ok(())
}
