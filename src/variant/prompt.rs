//! Interactive variant selection: arrow-key menu or numbered prompt

use std::fmt;
use std::io::{BufRead, Write};

use inquire::Select;

use super::Variant;
use crate::config::Settings;
use crate::error::{DeskforgeError, Result};

/// Menu entry describing what a variant installs
#[derive(Debug, Clone, PartialEq)]
pub struct VariantOption {
    pub variant: Variant,
    pub label: String,
}

impl VariantOption {
    /// One option per variant, labelled with the configured stack names
    pub fn all(settings: &Settings) -> Vec<Self> {
        Variant::ALL
            .into_iter()
            .map(|variant| {
                let label = match variant {
                    Variant::A => settings.stack_a.label.clone(),
                    Variant::B => settings.stack_b.label.clone(),
                    Variant::Both => format!(
                        "{} + {}",
                        settings.stack_a.label, settings.stack_b.label
                    ),
                };
                Self { variant, label }
            })
            .collect()
    }
}

impl fmt::Display for VariantOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<4} {}", self.variant.as_str(), self.label)
    }
}

/// Arrow-key menu; Esc or Ctrl-C means no selection
pub fn select_with_menu(options: &[VariantOption]) -> Result<Variant> {
    let choice = Select::new("Which desktop stack should be provisioned?", options.to_vec())
        .with_help_message("↑↓ to move, ENTER to confirm, ESC to cancel")
        .prompt()?;
    Ok(choice.variant)
}

/// Numbered prompt for sessions without a terminal UI
///
/// Empty input or end of input means no selection. Anything that is not one
/// of the listed numbers is an invalid choice.
pub fn select_with_prompt<R, W>(
    input: &mut R,
    output: &mut W,
    options: &[VariantOption],
) -> Result<Variant>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "Which desktop stack should be provisioned?")?;
    for (index, option) in options.iter().enumerate() {
        writeln!(output, "  {}) {}", index + 1, option)?;
    }
    write!(output, "Enter choice [1-{}]: ", options.len())?;
    output.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line)?;
    let answer = line.trim();
    if read == 0 || answer.is_empty() {
        return Err(DeskforgeError::NoVariantSelected);
    }

    answer
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| options.get(index))
        .map(|option| option.variant)
        .ok_or_else(|| DeskforgeError::InvalidChoice {
            input: answer.to_string(),
            max: options.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_prompt(answer: &str) -> (Result<Variant>, String) {
        let options = VariantOption::all(&Settings::default());
        let mut input = Cursor::new(answer.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = select_with_prompt(&mut input, &mut output, &options);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_prompt_lists_numbered_options() {
        let (_, shown) = run_prompt("1\n");
        assert!(shown.contains("1) A"));
        assert!(shown.contains("2) B"));
        assert!(shown.contains("3) BOTH"));
        assert!(shown.contains("Enter choice [1-3]"));
    }

    #[test]
    fn test_prompt_maps_number_to_variant() {
        assert_eq!(run_prompt("1\n").0.unwrap(), Variant::A);
        assert_eq!(run_prompt("2\n").0.unwrap(), Variant::B);
        assert_eq!(run_prompt(" 3 \n").0.unwrap(), Variant::Both);
    }

    #[test]
    fn test_prompt_end_of_input_is_no_selection() {
        assert!(matches!(
            run_prompt("").0,
            Err(DeskforgeError::NoVariantSelected)
        ));
        assert!(matches!(
            run_prompt("\n").0,
            Err(DeskforgeError::NoVariantSelected)
        ));
    }

    #[test]
    fn test_prompt_out_of_range_is_invalid_choice() {
        assert!(matches!(
            run_prompt("4\n").0,
            Err(DeskforgeError::InvalidChoice { max: 3, .. })
        ));
        assert!(matches!(
            run_prompt("0\n").0,
            Err(DeskforgeError::InvalidChoice { .. })
        ));
        assert!(matches!(
            run_prompt("dwm\n").0,
            Err(DeskforgeError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn test_both_label_names_both_stacks() {
        let options = VariantOption::all(&Settings::default());
        assert!(options[2].label.contains("dwm"));
        assert!(options[2].label.contains("Hyprland"));
    }
}
