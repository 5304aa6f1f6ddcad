use sessionkit::error::{ErrorContext, ResultExt, SessionKitError};
use sessionkit::startup::{AppContext, ClientConfig, APP_VERSION};

use color_eyre::Result;

const USAGE: &str = "\
Usage: sessionkit <command>

Commands:
  status          Show storage backend and session state
  whoami          Fetch the signed-in user from the API
  login <token>   Verify a token against the API and persist the session
  logout          End the session
  --version       Print version";

/// Print a failed request the way a user should see it.
fn report(err: &SessionKitError) {
    if let Some(context) = err.context() {
        tracing::debug!(error = %err, "{}", context.to_log_string());
    }
    eprintln!("Error [{}]: {}", err.error_code(), err.user_message());
    eprintln!("  {}", err.recovery_hint());
}

fn status(ctx: &AppContext) {
    let state = ctx.session.snapshot();
    println!("Storage:  {}", ctx.store.backend_name());
    println!("API:      {}", ctx.config.api_base_url);
    println!("Route:    {}", ctx.route());
    match state.user {
        Some(user) if state.is_authenticated => println!("User:     {} <{}>", user.name, user.email),
        _ => println!("User:     (signed out)"),
    }
}

async fn whoami(ctx: &AppContext) -> bool {
    match ctx.api.refresh_session_user(&ctx.session).await {
        Ok(user) => {
            println!("{} <{}> (id {})", user.name, user.email, user.id);
            true
        }
        Err(e) => {
            report(&e);
            false
        }
    }
}

/// Verify `token` with an explicit credential first, so a rejected or
/// unreachable login leaves any existing session as it was.
async fn login(ctx: &AppContext, token: &str) -> bool {
    let user = match ctx.api.verify_token(token).await {
        Ok(user) => user,
        Err(e) => {
            report(&e);
            return false;
        }
    };

    let result = ctx
        .session
        .login(user.clone(), token)
        .context(ErrorContext::new("login").with_component("session"));
    match result {
        Ok(()) => {
            println!("Signed in as {} <{}>", user.name, user.email);
            true
        }
        Err(e) => {
            report(&e);
            false
        }
    }
}

fn main() -> Result<()> {
    // Handle --version flag before any initialization
    if std::env::args().any(|arg| arg == "--version") {
        println!("sessionkit {}", APP_VERSION);
        return Ok(());
    }

    color_eyre::install()?;
    sessionkit::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str);

    let config = ClientConfig::from_env();
    if let Err(e) = config.validate() {
        report(&e);
        std::process::exit(1);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let ok = runtime.block_on(async {
        let ctx = AppContext::bootstrap(config).await;

        let ok = match command {
            Some("status") => {
                status(&ctx);
                true
            }
            Some("whoami") => whoami(&ctx).await,
            Some("login") => match args.get(1) {
                Some(token) => login(&ctx, token).await,
                None => {
                    eprintln!("{}", USAGE);
                    false
                }
            },
            Some("logout") => {
                ctx.session.logout();
                println!("Signed out.");
                true
            }
            _ => {
                eprintln!("{}", USAGE);
                command.is_none()
            }
        };

        ctx.shutdown().await?;
        Ok::<bool, SessionKitError>(ok)
    })?;

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
