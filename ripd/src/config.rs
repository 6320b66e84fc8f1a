//! The router configuration file.
//!
//! Line-oriented text: blank lines and lines starting with `//` are ignored,
//! everything else is a whitespace-separated directive. `router-id`,
//! `input-ports`, `outputs` and `output-port` are mandatory and may appear
//! at most once; `update-period` is optional.

use std::time::Duration;

use thiserror::Error;

use rip_core::neighbour::Neighbour;
use rip_core::{RouterId, MAX_PORT, MAX_ROUTER_ID, MIN_PORT, MIN_ROUTER_ID};

/// Seconds between periodic updates when the file does not say otherwise.
pub const DEFAULT_UPDATE_PERIOD_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub router_id: RouterId,
    pub input_ports: Vec<u16>,
    pub outputs: Vec<Neighbour>,
    pub output_port: u16,
    pub update_period_secs: u64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} defined more than once")]
    Duplicate(&'static str),
    #[error("{0} is not a valid parameter")]
    UnknownDirective(String),
    #[error("router-id must be a single integer between 1 and 64000")]
    BadRouterId,
    #[error("input-ports must be a non-empty list of integers between 1024 and 64000")]
    BadInputPorts,
    #[error("outputs must be a non-empty list of port-metric-id triples, \
             with ports between 1024 and 64000, metrics of at least 1 \
             and ids between 1 and 64000")]
    BadOutputs,
    #[error("output-port must be a single integer between 1024 and 64000")]
    BadOutputPort,
    #[error("update-period must be a single positive integer")]
    BadUpdatePeriod,
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("neighbour port numbers must be different from this router's input and output ports")]
    NeighbourPortCollision,
    #[error("output port number must be different from input port numbers")]
    OutputPortCollision,
    #[error("neighbour router ids must be different from router-id")]
    NeighbourIsSelf,
}

impl Config {
    pub fn parse(text: &str) -> Result<Config, ConfigError> {
        let mut router_id = None;
        let mut input_ports: Option<Vec<u16>> = None;
        let mut outputs: Option<Vec<Neighbour>> = None;
        let mut output_port = None;
        let mut update_period = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let directive = tokens.next().expect("non-blank line has a first token");
            let args: Vec<&str> = tokens.collect();

            match directive {
                "router-id" => {
                    check_unset(&router_id, "router-id")?;
                    router_id = Some(parse_router_id(&args)?);
                }
                "input-ports" => {
                    check_unset(&input_ports, "input-ports")?;
                    input_ports = Some(parse_input_ports(&args)?);
                }
                "outputs" => {
                    check_unset(&outputs, "outputs")?;
                    outputs = Some(parse_outputs(&args)?);
                }
                "output-port" => {
                    check_unset(&output_port, "output-port")?;
                    output_port = Some(
                        single(&args)
                            .and_then(parse_port)
                            .ok_or(ConfigError::BadOutputPort)?,
                    );
                }
                "update-period" => {
                    check_unset(&update_period, "update-period")?;
                    let period: u64 = single(&args)
                        .and_then(|t| t.parse().ok())
                        .ok_or(ConfigError::BadUpdatePeriod)?;
                    if period == 0 {
                        return Err(ConfigError::BadUpdatePeriod);
                    }
                    update_period = Some(period);
                }
                other => return Err(ConfigError::UnknownDirective(other.to_string())),
            }
        }

        let config = Config {
            router_id: router_id.ok_or(ConfigError::Missing("router-id"))?,
            input_ports: input_ports.ok_or(ConfigError::Missing("input-ports"))?,
            outputs: outputs.ok_or(ConfigError::Missing("outputs"))?,
            output_port: output_port.ok_or(ConfigError::Missing("output-port"))?,
            update_period_secs: update_period.unwrap_or(DEFAULT_UPDATE_PERIOD_SECS),
        };
        config.cross_check()?;
        Ok(config)
    }

    pub fn update_period(&self) -> Duration {
        Duration::from_secs(self.update_period_secs)
    }

    /// The port sets named in the file must not overlap, and no neighbour
    /// may claim this router's own id.
    fn cross_check(&self) -> Result<(), ConfigError> {
        if self.input_ports.contains(&self.output_port) {
            return Err(ConfigError::OutputPortCollision);
        }
        for neighbour in &self.outputs {
            if self.input_ports.contains(&neighbour.input_port)
                || neighbour.input_port == self.output_port
            {
                return Err(ConfigError::NeighbourPortCollision);
            }
            if neighbour.id == self.router_id {
                return Err(ConfigError::NeighbourIsSelf);
            }
        }
        Ok(())
    }
}

fn check_unset<T>(slot: &Option<T>, name: &'static str) -> Result<(), ConfigError> {
    if slot.is_some() {
        return Err(ConfigError::Duplicate(name));
    }
    Ok(())
}

fn parse_router_id(args: &[&str]) -> Result<RouterId, ConfigError> {
    let id: u16 = single(args)
        .and_then(|t| t.parse().ok())
        .ok_or(ConfigError::BadRouterId)?;
    if !(MIN_ROUTER_ID..=MAX_ROUTER_ID).contains(&id) {
        return Err(ConfigError::BadRouterId);
    }
    Ok(id)
}

fn parse_input_ports(args: &[&str]) -> Result<Vec<u16>, ConfigError> {
    if args.is_empty() {
        return Err(ConfigError::BadInputPorts);
    }
    args.iter()
        .map(|&t| parse_port(t).ok_or(ConfigError::BadInputPorts))
        .collect()
}

fn parse_outputs(args: &[&str]) -> Result<Vec<Neighbour>, ConfigError> {
    if args.is_empty() {
        return Err(ConfigError::BadOutputs);
    }
    args.iter().map(|&t| parse_output(t)).collect()
}

/// One `port-metric-id` triple.
fn parse_output(token: &str) -> Result<Neighbour, ConfigError> {
    let mut parts = token.split('-');
    let (Some(port), Some(metric), Some(id), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ConfigError::BadOutputs);
    };

    let input_port = parse_port(port).ok_or(ConfigError::BadOutputs)?;
    let link_metric: u16 = metric.parse().ok().filter(|&m| m >= 1).ok_or(ConfigError::BadOutputs)?;
    let id: u16 = id.parse().ok().ok_or(ConfigError::BadOutputs)?;
    if !(MIN_ROUTER_ID..=MAX_ROUTER_ID).contains(&id) {
        return Err(ConfigError::BadOutputs);
    }

    Ok(Neighbour {
        id,
        link_metric,
        input_port,
    })
}

fn parse_port(token: &str) -> Option<u16> {
    token
        .parse()
        .ok()
        .filter(|p| (MIN_PORT..=MAX_PORT).contains(p))
}

/// The argument of a directive that takes exactly one.
fn single<'a>(args: &[&'a str]) -> Option<&'a str> {
    if args.len() == 1 {
        Some(args[0])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "\
// demo router
router-id 1

input-ports 6110 6201
outputs 5002-1-2 5003-5-3
output-port 6300
update-period 10
";

    #[test]
    fn parses_a_complete_file() {
        let config = Config::parse(GOOD).unwrap();
        assert_eq!(config.router_id, 1);
        assert_eq!(config.input_ports, vec![6110, 6201]);
        assert_eq!(config.output_port, 6300);
        assert_eq!(config.update_period_secs, 10);
        assert_eq!(
            config.outputs,
            vec![
                Neighbour {
                    id: 2,
                    link_metric: 1,
                    input_port: 5002
                },
                Neighbour {
                    id: 3,
                    link_metric: 5,
                    input_port: 5003
                },
            ]
        );
    }

    #[test]
    fn update_period_defaults_to_thirty_seconds() {
        let text = "router-id 1\ninput-ports 6110\noutputs 5002-1-2\noutput-port 6300\n";
        let config = Config::parse(text).unwrap();
        assert_eq!(config.update_period_secs, 30);
        assert_eq!(config.update_period(), Duration::from_secs(30));
    }

    #[test]
    fn rejects_duplicate_directives() {
        let text = format!("{GOOD}router-id 7\n");
        assert_eq!(
            Config::parse(&text),
            Err(ConfigError::Duplicate("router-id"))
        );
    }

    #[test]
    fn rejects_unknown_directives() {
        let text = format!("{GOOD}hostname fred\n");
        assert_eq!(
            Config::parse(&text),
            Err(ConfigError::UnknownDirective("hostname".to_string()))
        );
    }

    #[test]
    fn reports_the_first_missing_directive() {
        assert_eq!(
            Config::parse("input-ports 6110\n"),
            Err(ConfigError::Missing("router-id"))
        );
        assert_eq!(
            Config::parse("router-id 1\n"),
            Err(ConfigError::Missing("input-ports"))
        );
        assert_eq!(
            Config::parse("router-id 1\ninput-ports 6110\n"),
            Err(ConfigError::Missing("outputs"))
        );
        assert_eq!(
            Config::parse("router-id 1\ninput-ports 6110\noutputs 5002-1-2\n"),
            Err(ConfigError::Missing("output-port"))
        );
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            Config::parse("router-id 0\n"),
            Err(ConfigError::BadRouterId)
        );
        assert_eq!(
            Config::parse("router-id 64001\n"),
            Err(ConfigError::BadRouterId)
        );
        assert_eq!(
            Config::parse("router-id 1\ninput-ports 1023\n"),
            Err(ConfigError::BadInputPorts)
        );
        assert_eq!(
            Config::parse("router-id 1\ninput-ports 6110\noutputs 5002-0-2\n"),
            Err(ConfigError::BadOutputs)
        );
        assert_eq!(
            Config::parse("router-id 1\ninput-ports 6110\noutputs 5002-1\n"),
            Err(ConfigError::BadOutputs)
        );
        assert_eq!(
            Config::parse("router-id 1\ninput-ports 6110\noutputs 5002-1-2-9\n"),
            Err(ConfigError::BadOutputs)
        );
        assert_eq!(
            Config::parse("router-id 1\ninput-ports 6110\noutputs 5002-1-2\noutput-port 99\n"),
            Err(ConfigError::BadOutputPort)
        );
        assert_eq!(
            Config::parse(&GOOD.replace("update-period 10", "update-period 0")),
            Err(ConfigError::BadUpdatePeriod)
        );
    }

    #[test]
    fn rejects_port_collisions() {
        assert_eq!(
            Config::parse("router-id 1\ninput-ports 6110\noutputs 5002-1-2\noutput-port 6110\n"),
            Err(ConfigError::OutputPortCollision)
        );
        assert_eq!(
            Config::parse("router-id 1\ninput-ports 6110\noutputs 6110-1-2\noutput-port 6300\n"),
            Err(ConfigError::NeighbourPortCollision)
        );
        assert_eq!(
            Config::parse("router-id 1\ninput-ports 6110\noutputs 6300-1-2\noutput-port 6300\n"),
            Err(ConfigError::NeighbourPortCollision)
        );
    }

    #[test]
    fn rejects_a_neighbour_with_our_own_id() {
        assert_eq!(
            Config::parse("router-id 2\ninput-ports 6110\noutputs 5002-1-2\noutput-port 6300\n"),
            Err(ConfigError::NeighbourIsSelf)
        );
    }
}
