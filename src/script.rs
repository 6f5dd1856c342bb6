//! Microprogram scripts.
//!
//! A script is a list of microinstructions, one per line. Each line names
//! the signals to arm before the next clock pulse:
//! ```text
//! ; fetch: address from L, read, into I, next line
//! WYL WEA
//! CZYT WYS WEI IL
//! WYAD, WEA        ; commas work too
//! ```
//! Names are case-insensitive. Blank lines and comments are skipped.

use crate::machine::{ControlUnit, Signal, SignalConflict, SignalSet};
use thiserror::Error;
use tracing::{event, Level};

/// The signals armed together for one clock pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Microinstruction {
    /// Source line, 1-based.
    pub line: usize,
    pub signals: SignalSet,
}

/// Parse a script into microinstructions.
///
/// Every line is checked the way the panel checks button presses, so a
/// script that parses can always be armed.
pub fn parse(source: &str) -> Result<Vec<Microinstruction>, ScriptError> {
    let mut program = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        let line_num = idx + 1;
        let code = match line.find(';') {
            Some(pos) => &line[..pos],
            None => line,
        };

        let mut signals = SignalSet::new();
        for name in code.split(|c: char| c.is_whitespace() || c == ',') {
            if name.is_empty() {
                continue;
            }
            let signal = Signal::from_name(name).ok_or_else(|| ScriptError::UnknownSignal {
                line: line_num,
                name: name.to_string(),
            })?;
            if signals.contains(signal) {
                return Err(ScriptError::DuplicateSignal { line: line_num, signal });
            }
            if let Some(armed) = signals.first_conflict(signal) {
                return Err(ScriptError::Conflict { line: line_num, signal, armed });
            }
            signals.insert(signal);
        }

        if !signals.is_empty() {
            program.push(Microinstruction { line: line_num, signals });
        }
    }

    Ok(program)
}

/// Run a program: arm each microinstruction and pulse. Returns the number
/// of pulses.
pub fn run(unit: &mut ControlUnit, program: &[Microinstruction]) -> Result<usize, ScriptError> {
    run_traced(unit, program, |_, _| {})
}

/// Like [`run`], calling `trace` after every pulse.
pub fn run_traced<F>(
    unit: &mut ControlUnit,
    program: &[Microinstruction],
    mut trace: F,
) -> Result<usize, ScriptError>
where
    F: FnMut(&Microinstruction, &ControlUnit),
{
    for step in program {
        let armed = unit.armed();
        // Signals already armed by hand are left alone: toggling would disarm them.
        let pending: Vec<Signal> = step.signals.iter().filter(|&s| !armed.contains(s)).collect();

        // The whole line is refused before any of it is armed.
        for &signal in &pending {
            if let Some(armed) = armed.first_conflict(signal) {
                return Err(ScriptError::Rejected {
                    line: step.line,
                    source: SignalConflict { signal, armed },
                });
            }
        }

        for signal in pending {
            unit.arm_signal(signal)
                .map_err(|source| ScriptError::Rejected { line: step.line, source })?;
        }
        unit.pulse();
        trace(step, unit);
    }

    event!(Level::INFO, pulses = program.len(), "script finished");
    Ok(program.len())
}

/// Render a program back to script text.
pub fn format(program: &[Microinstruction]) -> String {
    let mut output = String::new();
    for step in program {
        output.push_str(&step.signals.to_string());
        output.push('\n');
    }
    output
}

/// Errors from parsing or running a script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("unknown signal on line {line}: {name}")]
    UnknownSignal { line: usize, name: String },

    #[error("signal {signal} repeated on line {line}")]
    DuplicateSignal { line: usize, signal: Signal },

    #[error("line {line}: signal {signal} conflicts with {armed}")]
    Conflict { line: usize, signal: Signal, armed: Signal },

    #[error("line {line}: {source}")]
    Rejected {
        line: usize,
        #[source]
        source: SignalConflict,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::Word8;

    #[test]
    fn test_parse_simple() {
        let source = r#"
            ; fetch
            WYL WEA
            czyt, wys, wei ; read
            IL
        "#;

        let program = parse(source).unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(program[0].line, 3);
        assert!(program[1].signals.contains(Signal::Czyt));
        assert_eq!(program[1].signals.len(), 3);
        assert_eq!(program[2].line, 5);
    }

    #[test]
    fn test_parse_errors_carry_line() {
        assert_eq!(
            parse("IL\nWYL FOO"),
            Err(ScriptError::UnknownSignal { line: 2, name: "FOO".into() })
        );
        assert_eq!(
            parse("IL il"),
            Err(ScriptError::DuplicateSignal { line: 1, signal: Signal::Il })
        );
        assert_eq!(
            parse("\n\nCZYT PISZ"),
            Err(ScriptError::Conflict { line: 3, signal: Signal::Pisz, armed: Signal::Czyt })
        );
    }

    #[test]
    fn test_run_fetch_cycle() {
        // A = L, read PaO[A] into S, S into I over busS.
        let program = parse("WYL WEA\nCZYT WYS WEI IL").unwrap();
        let mut unit = ControlUnit::new();
        unit.load_memory(&[Word8::truncate(0b1010_0110)]).unwrap();

        let mut seen = Vec::new();
        let pulses = run_traced(&mut unit, &program, |step, unit| {
            seen.push((step.line, unit.pulses()));
        })
        .unwrap();

        assert_eq!(pulses, 2);
        assert_eq!(seen, vec![(1, 1), (2, 2)]);
        assert_eq!(unit.registers().i.value(), 0b1010_0110);
        assert_eq!(unit.registers().l.value(), 1);
        assert!(unit.armed().is_empty());
    }

    #[test]
    fn test_run_reports_conflict_with_prearmed() {
        let program = parse("PISZ").unwrap();
        let mut unit = ControlUnit::new();
        unit.arm_signal(Signal::Czyt).unwrap();

        let err = run(&mut unit, &program).unwrap_err();
        assert!(matches!(err, ScriptError::Rejected { line: 1, .. }));
        assert_eq!(unit.pulses(), 0);
    }

    #[test]
    fn test_failed_line_arms_nothing() {
        let program = parse("WYL CZYT").unwrap();
        let mut unit = ControlUnit::new();
        unit.arm_signal(Signal::Pisz).unwrap();

        let err = run(&mut unit, &program).unwrap_err();
        assert_eq!(
            err,
            ScriptError::Rejected {
                line: 1,
                source: SignalConflict { signal: Signal::Czyt, armed: Signal::Pisz },
            }
        );
        assert_eq!(unit.armed(), [Signal::Pisz].into_iter().collect::<SignalSet>());
        assert!(!unit.armed().contains(Signal::Wyl));
        assert_eq!(unit.pulses(), 0);
    }

    #[test]
    fn test_format_reparses() {
        let program = parse("wel wyl ; comment\n\nDOD, WYAK").unwrap();
        let text = format(&program);
        let again = parse(&text).unwrap();
        let sets: Vec<_> = program.iter().map(|m| m.signals).collect();
        let again: Vec<_> = again.iter().map(|m| m.signals).collect();
        assert_eq!(sets, again);
    }
}
