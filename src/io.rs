use std::io::{BufRead, Write};

use log::{debug, warn};

use crate::constants::COMMENT_MARKER;
use crate::error::{Result, SimError};
use crate::memory::EvictionPolicy;
use crate::translation::VirtualAddress;
use crate::vm_manager::MemoryManager;

/// READ and WRITE translate identically; the kind is kept for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Access(AccessKind, VirtualAddress),
    Pages,
    Frames,
    Time,
    Ref,
    Clear,
}

/// Remove an end-of-line comment and surrounding whitespace
pub fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_MARKER) {
        Some(start) => line[..start].trim(),
        None => line.trim(),
    }
}

/// Parse a hexadecimal address, with or without a `0x` prefix
pub fn parse_hex_address(token: &str) -> Result<VirtualAddress> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    VirtualAddress::from_str_radix(digits, 16).map_err(|_| SimError::InvalidAddress(token.to_string()))
}

impl Command {
    /// Parse one input line; blank and comment-only lines give `None`
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let mut tokens = strip_comment(line).split_whitespace();
        let Some(cmd) = tokens.next() else {
            return Ok(None);
        };

        let command = match cmd {
            "READ" | "WRITE" => {
                let kind = if cmd == "READ" { AccessKind::Read } else { AccessKind::Write };
                let token = tokens.next().ok_or_else(|| SimError::MissingOperand(cmd.to_string()))?;
                Command::Access(kind, parse_hex_address(token)?)
            }
            "PAGES" => Command::Pages,
            "FRAMES" => Command::Frames,
            "TIME" => Command::Time,
            "REF" => Command::Ref,
            "CLEAR" => Command::Clear,
            other => return Err(SimError::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Run one command against the manager, writing its output
pub fn execute<W: Write>(command: Command, mm: &mut MemoryManager, out: &mut W) -> Result<()> {
    match command {
        Command::Access(kind, address) => {
            let result = mm.access(address)?;
            debug!("{:?} {:#010x}: {}", kind, address, result);
            writeln!(out, "{}", result)?;
        }
        Command::Pages => {
            writeln!(out, "PageTable------")?;
            write!(out, "{}", mm.page_table())?;
            writeln!(out, "---------------")?;
        }
        Command::Frames => {
            writeln!(out, "RAM--------------")?;
            write!(out, "{}", mm.frames())?;
            writeln!(out, "-----------------")?;
        }
        Command::Time => mm.set_policy(EvictionPolicy::Timestamp),
        Command::Ref => mm.set_policy(EvictionPolicy::ReferenceBit),
        Command::Clear => mm.reset_reference_bits(),
    }
    Ok(())
}

/// Process every line of `input`, echoing `prompt` before each read when set.
///
/// A bad line is reported on `out` and skipped; only I/O failures end the run.
pub fn run_commands<R: BufRead, W: Write>(
    input: R,
    mm: &mut MemoryManager,
    out: &mut W,
    prompt: Option<&str>,
) -> Result<()> {
    let mut lines = input.lines();
    loop {
        if let Some(prompt) = prompt {
            write!(out, "{}", prompt)?;
            out.flush()?;
        }
        let Some(line) = lines.next() else { break };
        let line = line?;

        let outcome = Command::parse(&line).and_then(|command| match command {
            Some(command) => execute(command, mm, out),
            None => Ok(()),
        });

        match outcome {
            Ok(()) => {}
            Err(e @ SimError::UnknownCommand(_)) => {
                warn!("rejected line {:?}", line);
                writeln!(out, "{}", e)?;
            }
            Err(e) if e.is_recoverable() => {
                warn!("rejected line {:?}: {}", line, e);
                writeln!(out, "Error: {}", e)?;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
