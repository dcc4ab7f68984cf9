use std::io::{IsTerminal, Write};

use inquire::{Confirm, InquireError, Select, Text};
use skycast_core::{
    Place, Transition, UnitPreference, Widget, provider::geolocation::LocationConsent,
    render::{LOADING_TEXT, temperature_suffix},
};

/// Asks on the terminal before the location source is consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptConsent;

impl LocationConsent for PromptConsent {
    fn granted(&self) -> bool {
        Confirm::new("Allow skycast to use your location?")
            .with_default(false)
            .prompt()
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Search,
    MyLocation,
    SwitchUnit(UnitPreference),
    Quit,
}

impl Action {
    fn menu(unit: UnitPreference) -> Vec<Action> {
        vec![Action::Search, Action::MyLocation, Action::SwitchUnit(unit.toggled()), Action::Quit]
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Search => f.write_str("Search a city"),
            Action::MyLocation => f.write_str("Use my location"),
            Action::SwitchUnit(unit) => write!(f, "Switch to {}", temperature_suffix(*unit)),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

/// Menu loop. Ends on "Quit", Esc or Ctrl-C.
pub async fn run(mut widget: Widget) -> anyhow::Result<()> {
    loop {
        println!("{}", widget.render());

        let menu = Action::menu(widget.displayed_unit());
        let action = match Select::new("What next?", menu).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let transition = match action {
            Action::Search => {
                let query = match Text::new("City:")
                    .with_initial_value(&widget.state().query)
                    .prompt()
                {
                    Ok(query) => query,
                    Err(InquireError::OperationCanceled) => continue,
                    Err(InquireError::OperationInterrupted) => break,
                    Err(e) => return Err(e.into()),
                };
                widget.set_query(query);
                println!("{LOADING_TEXT}");
                widget.submit_search().await
            }
            Action::MyLocation => {
                println!("{LOADING_TEXT}");
                widget.use_my_location().await
            }
            Action::SwitchUnit(unit) => widget.change_unit(unit).await,
            Action::Quit => break,
        };

        apply_effects(&transition);
    }

    Ok(())
}

/// Side effects tied to a transition. A freshly resolved place retitles the
/// terminal window.
pub fn apply_effects(transition: &Transition) {
    if let Transition::Resolved(place) = transition {
        set_title(place);
    }
}

fn set_title(place: &Place) {
    let mut stdout = std::io::stdout();
    if !stdout.is_terminal() {
        return;
    }
    // OSC 0: set icon name and window title
    let _ = write!(stdout, "\x1b]0;skycast: {}\x07", place.display_name());
    let _ = stdout.flush();
}
