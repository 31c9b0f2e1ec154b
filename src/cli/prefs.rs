//! Preference CLI commands

use anyhow::Result;
use clap::{Subcommand, ValueEnum};

use super::output::Output;
use crate::domain::{Preferences, Theme};
use crate::store::TodoApp;

#[derive(Subcommand)]
pub enum PrefsCommands {
    /// Show current preferences
    Show,

    /// Set the theme, or switch between light and dark when omitted
    Theme {
        /// light or dark
        theme: Option<Theme>,
    },

    /// Turn reduced animations on or off
    ReduceAnimations {
        #[arg(value_enum)]
        state: Switch,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

pub fn run(cmd: PrefsCommands, app: &mut TodoApp, output: &Output) -> Result<()> {
    match cmd {
        PrefsCommands::Show => {}
        PrefsCommands::Theme { theme } => match theme {
            Some(theme) => app.view.set_theme(theme),
            None => {
                app.view.toggle_theme();
            }
        },
        PrefsCommands::ReduceAnimations { state } => {
            app.view.set_reduce_animations(state == Switch::On);
        }
    }

    show(&app.view.preferences(), output);
    Ok(())
}

fn show(preferences: &Preferences, output: &Output) {
    if output.is_json() {
        output.data(preferences);
    } else {
        println!("theme:             {}", preferences.theme);
        println!(
            "reduce animations: {}",
            if preferences.reduce_animations { "on" } else { "off" }
        );
    }
}
