//! Source/destination selection.
//!
//! The controller stays in [`FlowState::AwaitingValidSelection`] until it is
//! given two valid, distinct services, then moves to [`FlowState::Executing`].

use std::io::{BufRead, Write};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::prompt::Prompter;
use crate::service::Service;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    AwaitingValidSelection,
    Executing {
        source: Service,
        destination: Service,
    },
}

#[derive(Debug)]
pub struct FlowController {
    state: FlowState,
}

impl Default for FlowController {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowController {
    pub fn new() -> Self {
        Self {
            state: FlowState::AwaitingValidSelection,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Applies one pair of menu answers. The state only advances when both are
    /// valid and differ; a rejected pair leaves it untouched.
    pub fn submit(&mut self, source: &str, destination: &str) -> Result<(Service, Service)> {
        if let FlowState::Executing {
            source,
            destination,
        } = self.state
        {
            return Ok((source, destination));
        }

        let (source, destination) = validate_selection(source, destination)?;
        self.state = FlowState::Executing {
            source,
            destination,
        };
        Ok((source, destination))
    }
}

pub fn validate_selection(source: &str, destination: &str) -> Result<(Service, Service)> {
    let source = parse_choice(source)?;
    let destination = parse_choice(destination)?;

    if source == destination {
        return Err(AppError::InvalidSelection(
            "Please make sure your start and ending services are different".into(),
        ));
    }

    Ok((source, destination))
}

fn parse_choice(raw: &str) -> Result<Service> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .and_then(Service::from_menu)
        .ok_or_else(|| {
            AppError::InvalidSelection(format!("{:?} is not one of the provided options", raw.trim()))
        })
}

/// Asks for source and destination until a valid pair is given, at most
/// `max_attempts` times.
pub fn select_services<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    max_attempts: usize,
) -> Result<(Service, Service)> {
    let mut controller = FlowController::new();

    for attempt in 1..=max_attempts {
        prompter.say(&Service::menu())?;
        let source = prompter.ask("What are you converting from?")?;
        let destination = prompter.ask("What are you converting to?")?;

        match controller.submit(&source, &destination) {
            Ok((source, destination)) => {
                prompter.say(&format!(
                    "You are converting from {} to {}",
                    source, destination
                ))?;
                return Ok((source, destination));
            }
            Err(e) => {
                debug!("Rejected selection (attempt {}/{}): {}", attempt, max_attempts, e);
                prompter.say(&e.to_string())?;
            }
        }
    }

    Err(AppError::TooManyAttempts(max_attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<String>, Vec<u8>> {
        Prompter::new(Cursor::new(input.to_string()), Vec::new())
    }

    #[test]
    fn test_valid_selection_advances() {
        let mut controller = FlowController::new();
        let pair = controller.submit("1", "2").unwrap();

        assert_eq!(pair, (Service::Spotify, Service::YouTube));
        assert_eq!(
            controller.state(),
            FlowState::Executing {
                source: Service::Spotify,
                destination: Service::YouTube
            }
        );
    }

    #[test]
    fn test_same_service_never_advances() {
        let mut controller = FlowController::new();

        for choice in ["1", "2"] {
            assert!(matches!(
                controller.submit(choice, choice),
                Err(AppError::InvalidSelection(_))
            ));
            assert_eq!(controller.state(), FlowState::AwaitingValidSelection);
        }
    }

    #[test]
    fn test_out_of_range_or_garbage_never_advances() {
        let mut controller = FlowController::new();

        for (source, destination) in [("0", "1"), ("1", "3"), ("x", "2"), ("", ""), ("-1", "2")] {
            assert!(controller.submit(source, destination).is_err());
            assert_eq!(controller.state(), FlowState::AwaitingValidSelection);
        }
    }

    #[test]
    fn test_select_services_reprompts_until_valid() {
        let mut prompter = prompter("1\n1\n3\n1\n2\n1\n");

        let pair = select_services(&mut prompter, 5).unwrap();
        assert_eq!(pair, (Service::YouTube, Service::Spotify));

        let output = String::from_utf8(prompter.into_output()).unwrap();
        assert!(output.contains("different"));
        assert!(output.contains("not one of the provided options"));
        assert!(output.contains("You are converting from YouTube to Spotify"));
    }

    #[test]
    fn test_select_services_is_bounded() {
        let mut prompter = prompter("1\n1\n2\n2\n");

        let result = select_services(&mut prompter, 2);
        assert!(matches!(result, Err(AppError::TooManyAttempts(2))));
    }
}
