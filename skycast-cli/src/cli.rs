use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, CustomUserError, Select, Text, validator::Validation};
use skycast_core::{
    Config, Coordinates, GeolocationMode, UnitPreference, Widget,
    provider::geolocation::AlwaysGrant,
};

use crate::session::{self, PromptConsent};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "skycast",
    version,
    about = "Current weather and a 5-day forecast in your terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the default unit, geocoding language and location source.
    Configure,

    /// Show weather for a city.
    Show {
        /// City name, e.g. "Orlando".
        city: String,

        /// Override the configured unit ("fahrenheit" or "celsius").
        #[arg(long, value_parser = parse_unit)]
        unit: Option<UnitPreference>,
    },

    /// Show weather for your current location.
    Here {
        #[arg(long, value_parser = parse_unit)]
        unit: Option<UnitPreference>,

        /// Don't ask before using your location.
        #[arg(short, long)]
        yes: bool,
    },

    /// Search, locate and toggle units from a menu (the default).
    Interactive {
        #[arg(long, value_parser = parse_unit)]
        unit: Option<UnitPreference>,
    },
}

fn parse_unit(value: &str) -> Result<UnitPreference, String> {
    UnitPreference::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let command = self.command.unwrap_or(Command::Interactive { unit: None });
        tracing::debug!(?command, "starting");

        match command {
            Command::Configure => configure()?,
            Command::Show { city, unit } => {
                let config = Config::load()?;
                let mut widget = Widget::from_config(&config, AlwaysGrant)?
                    .with_unit(unit.unwrap_or(config.default_unit));
                widget.set_query(city);
                let transition = widget.submit_search().await;
                session::apply_effects(&transition);
                print!("{}", widget.render());
            }
            Command::Here { unit, yes } => {
                let config = Config::load()?;
                let widget = if yes {
                    Widget::from_config(&config, AlwaysGrant)?
                } else {
                    Widget::from_config(&config, PromptConsent)?
                };
                let mut widget = widget.with_unit(unit.unwrap_or(config.default_unit));
                let transition = widget.use_my_location().await;
                session::apply_effects(&transition);
                print!("{}", widget.render());
            }
            Command::Interactive { unit } => {
                let config = Config::load()?;
                let widget = Widget::from_config(&config, PromptConsent)?
                    .with_unit(unit.unwrap_or(config.default_unit));
                session::run(widget).await?;
            }
        }

        Ok(())
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let units = UnitPreference::all().to_vec();
    let start = units.iter().position(|u| *u == config.default_unit).unwrap_or(0);
    config.default_unit = Select::new("Default unit:", units)
        .with_starting_cursor(start)
        .prompt()
        .context("Unit selection aborted")?;

    config.language = Text::new("Geocoding language (ISO 639-1):")
        .with_initial_value(&config.language)
        .prompt()
        .context("Language prompt aborted")?;

    let modes = GeolocationMode::all().to_vec();
    let start = modes.iter().position(|m| *m == config.geolocation.mode).unwrap_or(0);
    let mode = Select::new("Where should \"use my location\" get coordinates from?", modes)
        .with_starting_cursor(start)
        .prompt()
        .context("Geolocation selection aborted")?;

    if mode == GeolocationMode::Fixed {
        let lat = CustomType::<f64>::new("Latitude:")
            .with_validator(|v: &f64| within(*v, 90.0))
            .prompt()
            .context("Latitude prompt aborted")?;
        let lon = CustomType::<f64>::new("Longitude:")
            .with_validator(|v: &f64| within(*v, 180.0))
            .prompt()
            .context("Longitude prompt aborted")?;
        config.set_fixed_location(Coordinates::new(lat, lon));
    } else {
        config.geolocation.mode = mode;
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

fn within(value: f64, bound: f64) -> Result<Validation, CustomUserError> {
    Ok(if (-bound..=bound).contains(&value) {
        Validation::Valid
    } else {
        Validation::Invalid(format!("must be within -{bound}..{bound}").into())
    })
}
