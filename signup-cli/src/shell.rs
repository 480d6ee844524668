//! Interactive shell - one page interaction per line
//!
//! Timers keep running between commands, so a feedback message disappears from
//! `page` output once its hide delay has passed.

use crate::print_message;
use signup_client::{render_text, ClickTarget, UiController};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Commands:
  page                          show the page
  refresh                       fetch activities again
  menu                          toggle the user menu
  click <icon|menu|backdrop|elsewhere>
  auth                          press the Login/Logout button
  login <username> <password>   submit the login form
  close                         close the login dialog
  logout                        log out
  register <email> <activity>   submit the signup form
  unregister <email> <activity> remove a participant
  remove <n>                    press the n-th [x] on the page
  wait <ms>                     let time pass
  help                          show this text
  quit                          leave the shell";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Page,
    Refresh,
    Menu,
    Click(ClickTarget),
    Auth,
    Login { username: String, password: String },
    Close,
    Logout,
    Register { email: String, activity: String },
    Unregister { email: String, activity: String },
    Remove(usize),
    Wait(u64),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word {
        "page" | "list" => Command::Page,
        "refresh" => Command::Refresh,
        "menu" => Command::Menu,
        "click" => Command::Click(match rest {
            "icon" => ClickTarget::UserIcon,
            "menu" => ClickTarget::UserMenu,
            "backdrop" => ClickTarget::LoginModalBackdrop,
            "elsewhere" | "" => ClickTarget::Elsewhere,
            other => return Err(format!("unknown click target '{}'", other)),
        }),
        "auth" => Command::Auth,
        "login" => {
            let (username, password) = split_pair(rest, "login <username> <password>")?;
            Command::Login { username, password }
        }
        "close" => Command::Close,
        "logout" => Command::Logout,
        "register" => {
            let (email, activity) = split_pair(rest, "register <email> <activity>")?;
            Command::Register { email, activity }
        }
        "unregister" => {
            let (email, activity) = split_pair(rest, "unregister <email> <activity>")?;
            Command::Unregister { email, activity }
        }
        "remove" => Command::Remove(
            rest.parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| "usage: remove <n>".to_string())?,
        ),
        "wait" => Command::Wait(
            rest.parse::<u64>()
                .map_err(|_| "usage: wait <ms>".to_string())?,
        ),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };

    Ok(command)
}

/// First word, then everything after it (activity names contain spaces)
fn split_pair(rest: &str, usage: &str) -> Result<(String, String), String> {
    match rest.split_once(' ') {
        Some((first, second)) if !second.trim().is_empty() => {
            Ok((first.to_string(), second.trim().to_string()))
        }
        _ => Err(format!("usage: {}", usage)),
    }
}

pub async fn run(controller: &UiController) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    print!("{}", render_text(&controller.page().await));
    println!("Type 'help' for commands.");

    loop {
        stdout.write_all(b"signup> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        debug!(?command, "Shell command");

        match command {
            Command::Page => print!("{}", render_text(&controller.page().await)),
            Command::Refresh => controller.fetch_activities().await,
            Command::Menu => controller.toggle_user_menu().await,
            Command::Click(target) => controller.click(target).await,
            Command::Auth => controller.auth_button().await,
            Command::Login { username, password } => {
                print_message(&controller.login(&username, &password).await)
            }
            Command::Close => controller.close_login_modal().await,
            Command::Logout => controller.logout().await,
            Command::Register { email, activity } => {
                print_message(&controller.signup(&email, &activity).await)
            }
            Command::Unregister { email, activity } => {
                print_message(&controller.unregister(&activity, &email).await)
            }
            Command::Remove(n) => {
                let action = controller
                    .page()
                    .await
                    .unregister_actions()
                    .get(n - 1)
                    .map(|action| (*action).clone());
                match action {
                    Some(action) => print_message(&controller.activate(&action).await),
                    None => println!("No removable participant #{}", n),
                }
            }
            Command::Wait(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    Ok(())
}
