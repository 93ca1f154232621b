//! Reading instruction text.
//!
//! One instruction or label definition per line. Labels are resolved to
//! code addresses in a second pass, so forward references are fine.

use fool_core::AssemblyError;
use rustc_hash::FxHashMap;

/// A machine operation with its label operands resolved to addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Push(i32),
    Pop,
    Add,
    Sub,
    Mult,
    Div,
    Sw,
    Lw,
    B(usize),
    Beq(usize),
    Bleq(usize),
    Js,
    Lra,
    Sra,
    Ltm,
    Stm,
    Lfp,
    Sfp,
    Cfp,
    Lhp,
    Shp,
    Print,
    Halt,
}

/// Assembled code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    code: Vec<Op>,
}

impl Program {
    pub fn new(code: Vec<Op>) -> Self {
        Self { code }
    }

    pub fn ops(&self) -> &[Op] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

/// Assemble instruction text into a [`Program`].
pub fn assemble(text: &str) -> Result<Program, AssemblyError> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    // Pass 1: label addresses.
    let mut labels: FxHashMap<&str, usize> = FxHashMap::default();
    let mut address = 0;
    for &(line_no, line) in &lines {
        match line.strip_suffix(':') {
            Some(label) => {
                if labels.insert(label, address).is_some() {
                    return Err(AssemblyError::DuplicateLabel {
                        label: label.to_string(),
                        line: line_no,
                    });
                }
            }
            None => address += 1,
        }
    }

    // Pass 2: operations.
    let mut code = Vec::with_capacity(address);
    for &(line_no, line) in &lines {
        if line.ends_with(':') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let mnemonic = parts.next().unwrap_or_default();
        let operand = parts.next();
        if parts.next().is_some() {
            return Err(AssemblyError::InvalidOperand {
                mnemonic: mnemonic.to_string(),
                line: line_no,
            });
        }

        let target = |operand: Option<&str>| -> Result<usize, AssemblyError> {
            let label = operand.ok_or_else(|| AssemblyError::InvalidOperand {
                mnemonic: mnemonic.to_string(),
                line: line_no,
            })?;
            labels
                .get(label)
                .copied()
                .ok_or_else(|| AssemblyError::UndefinedLabel {
                    label: label.to_string(),
                    line: line_no,
                })
        };
        let bare = |op: Op| -> Result<Op, AssemblyError> {
            match operand {
                None => Ok(op),
                Some(_) => Err(AssemblyError::InvalidOperand {
                    mnemonic: mnemonic.to_string(),
                    line: line_no,
                }),
            }
        };

        let op = match mnemonic {
            "push" => match operand.map(str::parse::<i32>) {
                Some(Ok(value)) => Op::Push(value),
                Some(Err(_)) => {
                    let address = target(operand)?;
                    Op::Push(address as i32)
                }
                None => {
                    return Err(AssemblyError::InvalidOperand {
                        mnemonic: mnemonic.to_string(),
                        line: line_no,
                    });
                }
            },
            "b" => Op::B(target(operand)?),
            "beq" => Op::Beq(target(operand)?),
            "bleq" => Op::Bleq(target(operand)?),
            "pop" => bare(Op::Pop)?,
            "add" => bare(Op::Add)?,
            "sub" => bare(Op::Sub)?,
            "mult" => bare(Op::Mult)?,
            "div" => bare(Op::Div)?,
            "sw" => bare(Op::Sw)?,
            "lw" => bare(Op::Lw)?,
            "js" => bare(Op::Js)?,
            "lra" => bare(Op::Lra)?,
            "sra" => bare(Op::Sra)?,
            "ltm" => bare(Op::Ltm)?,
            "stm" => bare(Op::Stm)?,
            "lfp" => bare(Op::Lfp)?,
            "sfp" => bare(Op::Sfp)?,
            "cfp" => bare(Op::Cfp)?,
            "lhp" => bare(Op::Lhp)?,
            "shp" => bare(Op::Shp)?,
            "print" => bare(Op::Print)?,
            "halt" => bare(Op::Halt)?,
            other => {
                return Err(AssemblyError::UnknownInstruction {
                    mnemonic: other.to_string(),
                    line: line_no,
                });
            }
        };
        code.push(op);
    }

    tracing::debug!(ops = code.len(), labels = labels.len(), "assembled");
    Ok(Program::new(code))
}
