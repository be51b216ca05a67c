//! Interactive session: one line per interaction, full recompute on each change

use super::{chart, options, ui};
use crate::core::{ChartSpec, Dashboard, Selection};
use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error};

const HELP: &str = "Commands: from YYYY-MM-DD | to YYYY-MM-DD | ticker NAME | column NAME | show | options | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    From(NaiveDate),
    To(NaiveDate),
    Ticker(String),
    Column(String),
    Show,
    Options,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (verb, arg) = match s.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, arg.trim()),
            None => (s, ""),
        };

        let date_arg = || {
            NaiveDate::parse_from_str(arg, "%Y-%m-%d")
                .map_err(|_| anyhow!("Invalid date '{arg}', expected YYYY-MM-DD"))
        };
        let name_arg = || {
            if arg.is_empty() {
                Err(anyhow!("'{verb}' needs a value"))
            } else {
                Ok(arg.to_string())
            }
        };

        match verb.to_lowercase().as_str() {
            "from" => Ok(SessionCommand::From(date_arg()?)),
            "to" => Ok(SessionCommand::To(date_arg()?)),
            "ticker" => Ok(SessionCommand::Ticker(name_arg()?)),
            "column" => Ok(SessionCommand::Column(name_arg()?)),
            "show" => Ok(SessionCommand::Show),
            "options" => Ok(SessionCommand::Options),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
            _ => bail!("Unknown command '{verb}'. {HELP}"),
        }
    }
}

pub struct Session<'a> {
    dashboard: &'a Dashboard,
    selection: Selection,
    output: PathBuf,
}

impl<'a> Session<'a> {
    pub fn new(dashboard: &'a Dashboard, selection: Selection, output: PathBuf) -> Self {
        Self {
            dashboard,
            selection,
            output,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Applies one command. Returns `false` once the session should end.
    pub fn apply(&mut self, command: SessionCommand) -> bool {
        debug!(?command, "Session command");
        match command {
            SessionCommand::From(date) => self.selection.from = date,
            SessionCommand::To(date) => self.selection.to = date,
            SessionCommand::Ticker(ticker) => self.selection.ticker = ticker,
            SessionCommand::Column(column) => self.selection.column = column,
            SessionCommand::Show => {}
            SessionCommand::Options => {
                println!("{}", options::options_table(&self.dashboard.options()));
                return true;
            }
            SessionCommand::Help => {
                println!("{HELP}");
                return true;
            }
            SessionCommand::Quit => return false,
        }
        self.refresh();
        true
    }

    /// Recomposes the chart for the current selection and rewrites the output.
    pub fn refresh(&mut self) -> ChartSpec {
        let spec = self.dashboard.render(&self.selection);
        match chart::write_chart(&spec, &self.output) {
            Ok(()) => println!("{}", chart::summary_table(&self.selection, &spec)),
            Err(e) => {
                error!(error = %e, "Failed to write chart");
                eprintln!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error));
            }
        }
        spec
    }
}

/// Drives a session from `input` until it ends or the input is exhausted.
pub async fn run<R>(session: &mut Session<'_>, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    println!("{}", ui::style_text(HELP, ui::StyleType::Subtle));
    session.refresh();

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<SessionCommand>() {
            Ok(command) => {
                if !session.apply(command) {
                    break;
                }
            }
            Err(e) => eprintln!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error)),
        }
    }
    debug!("Session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cot::{CotRow, CotTable};
    use crate::core::{Observation, Series, Tables};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dashboard() -> Dashboard {
        let prices = Series::from_points(vec![
            Observation::new(date("2019-01-30"), 100.0),
            Observation::new(date("2019-01-31"), 102.0),
            Observation::new(date("2019-02-01"), 98.0),
        ]);
        let cot = CotTable::from_rows(vec![
            CotRow {
                ticker: "NG".to_string(),
                date: date("2019-01-29"),
                values: [("Comm_Long".to_string(), 5.0)].into_iter().collect(),
            },
            CotRow {
                ticker: "CL".to_string(),
                date: date("2019-01-29"),
                values: [("Comm_Long".to_string(), 9.0)].into_iter().collect(),
            },
        ]);
        Dashboard::new(Arc::new(Tables { cot, prices }))
    }

    fn read_figure(path: &std::path::Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "from 2019-01-31".parse::<SessionCommand>().unwrap(),
            SessionCommand::From(date("2019-01-31"))
        );
        assert_eq!(
            "  TO   2020-02-01 ".parse::<SessionCommand>().unwrap(),
            SessionCommand::To(date("2020-02-01"))
        );
        assert_eq!(
            "column Comm_Net".parse::<SessionCommand>().unwrap(),
            SessionCommand::Column("Comm_Net".to_string())
        );
        assert_eq!("q".parse::<SessionCommand>().unwrap(), SessionCommand::Quit);

        assert!("from yesterday".parse::<SessionCommand>().is_err());
        assert!("ticker".parse::<SessionCommand>().is_err());
        assert!("zoom 2".parse::<SessionCommand>().is_err());
    }

    #[test]
    fn test_apply_rerenders_on_change() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("chart.json");
        let dashboard = dashboard();
        let selection = dashboard.default_selection(date("2019-01-01"), date("2019-03-01"));
        let mut session = Session::new(&dashboard, selection, output.clone());

        assert!(session.apply(SessionCommand::From(date("2019-01-31"))));
        assert_eq!(read_figure(&output)["data"][0]["y"], serde_json::json!([102.0, 98.0]));

        assert!(session.apply(SessionCommand::To(date("2019-02-01"))));
        assert_eq!(read_figure(&output)["data"][0]["y"], serde_json::json!([102.0]));

        assert!(!session.apply(SessionCommand::Quit));
    }

    #[tokio::test]
    async fn test_run_reads_commands_until_quit() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("chart.json");
        let dashboard = dashboard();
        let selection = dashboard.default_selection(date("2019-01-01"), date("2019-03-01"));
        let mut session = Session::new(&dashboard, selection, output.clone());

        let input: &[u8] = b"ticker NG\nbogus\n\nfrom 2019-02-01\nquit\nticker CL\n";
        run(&mut session, input).await.unwrap();

        // Commands after quit are ignored
        assert_eq!(session.selection().ticker, "NG");
        assert_eq!(session.selection().from, date("2019-02-01"));
        let figure = read_figure(&output);
        assert_eq!(figure["data"][0]["y"], serde_json::json!([98.0]));
        assert_eq!(figure["data"][1]["y"], serde_json::json!([5.0]));
    }
}
