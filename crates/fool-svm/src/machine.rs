//! The stack virtual machine.
//!
//! Memory is one array of `memory_size` cells. The stack starts at the top
//! and grows down, the heap starts at 0 and grows up; the machine stops with
//! [`RuntimeError::StackOverflow`] when they meet.

use fool_core::{DEFAULT_MEMORY_SIZE, MachineConfig, RuntimeError};

use crate::assembler::{Op, Program};

/// Default instruction budget of one run.
pub const DEFAULT_MAX_STEPS: u64 = 10_000_000;

/// Machine parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    pub memory_size: i32,
    /// Instructions executed before giving up.
    pub max_steps: u64,
}

impl VmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memory_size(mut self, memory_size: i32) -> Self {
        self.memory_size = memory_size;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl From<MachineConfig> for VmConfig {
    fn from(machine: MachineConfig) -> Self {
        Self::default().with_memory_size(machine.memory_size)
    }
}

/// What a finished run left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Top of stack at `halt`, if the stack was not empty.
    pub result: Option<i32>,
    /// Every value printed, in order.
    pub output: Vec<i32>,
    /// Instructions executed.
    pub steps: u64,
}

/// A machine loaded with a program.
#[derive(Debug)]
pub struct Machine {
    code: Vec<Op>,
    memory: Vec<i32>,
    config: VmConfig,
    ip: usize,
    sp: i32,
    fp: i32,
    hp: i32,
    ra: i32,
    tm: i32,
    output: Vec<i32>,
}

impl Machine {
    pub fn new(program: Program, config: VmConfig) -> Self {
        let size = config.memory_size.max(0);
        Self {
            code: program.ops().to_vec(),
            memory: vec![0; size as usize],
            config,
            ip: 0,
            sp: size,
            fp: size,
            hp: 0,
            ra: 0,
            tm: 0,
            output: Vec::new(),
        }
    }

    /// Execute until `halt`.
    pub fn run(mut self) -> Result<Outcome, RuntimeError> {
        let mut steps = 0;
        loop {
            if steps >= self.config.max_steps {
                return Err(RuntimeError::StepLimitExceeded {
                    limit: self.config.max_steps,
                });
            }
            steps += 1;

            let at = self.ip;
            let op = *self.code.get(at).ok_or(RuntimeError::InvalidCodeAddress {
                address: at as i64,
                ip: at,
            })?;
            self.ip += 1;
            tracing::trace!(ip = at, ?op, sp = self.sp, "step");

            match op {
                Op::Push(value) => self.push(value, at)?,
                Op::Pop => {
                    self.pop(at)?;
                }
                Op::Add => self.binary(at, |l, r| Ok(l.wrapping_add(r)))?,
                Op::Sub => self.binary(at, |l, r| Ok(l.wrapping_sub(r)))?,
                Op::Mult => self.binary(at, |l, r| Ok(l.wrapping_mul(r)))?,
                Op::Div => self.binary(at, |l, r| {
                    if r == 0 {
                        Err(RuntimeError::DivisionByZero { ip: at })
                    } else {
                        Ok(l.wrapping_div(r))
                    }
                })?,
                Op::Sw => {
                    let address = self.pop(at)?;
                    let value = self.pop(at)?;
                    *self.cell(address, at)? = value;
                }
                Op::Lw => {
                    let address = self.pop(at)?;
                    let value = *self.cell(address, at)?;
                    self.push(value, at)?;
                }
                Op::B(target) => self.ip = target,
                Op::Beq(target) => {
                    let right = self.pop(at)?;
                    let left = self.pop(at)?;
                    if left == right {
                        self.ip = target;
                    }
                }
                Op::Bleq(target) => {
                    let right = self.pop(at)?;
                    let left = self.pop(at)?;
                    if left <= right {
                        self.ip = target;
                    }
                }
                Op::Js => {
                    let address = self.pop(at)?;
                    if address < 0 || address as usize >= self.code.len() {
                        return Err(RuntimeError::InvalidCodeAddress {
                            address: i64::from(address),
                            ip: at,
                        });
                    }
                    self.ra = self.ip as i32;
                    self.ip = address as usize;
                }
                Op::Lra => self.push(self.ra, at)?,
                Op::Sra => self.ra = self.pop(at)?,
                Op::Ltm => self.push(self.tm, at)?,
                Op::Stm => self.tm = self.pop(at)?,
                Op::Lfp => self.push(self.fp, at)?,
                Op::Sfp => self.fp = self.pop(at)?,
                Op::Cfp => self.fp = self.sp,
                Op::Lhp => self.push(self.hp, at)?,
                Op::Shp => self.hp = self.pop(at)?,
                Op::Print => {
                    let top = self.peek(at)?;
                    tracing::debug!(value = top, "print");
                    self.output.push(top);
                }
                Op::Halt => break,
            }
        }

        let result = usize::try_from(self.sp)
            .ok()
            .and_then(|sp| self.memory.get(sp).copied());
        tracing::debug!(steps, ?result, "halted");
        Ok(Outcome {
            result,
            output: self.output,
            steps,
        })
    }

    fn push(&mut self, value: i32, ip: usize) -> Result<(), RuntimeError> {
        if self.sp <= self.hp || self.sp <= 0 {
            return Err(RuntimeError::StackOverflow { ip });
        }
        self.sp -= 1;
        self.memory[self.sp as usize] = value;
        Ok(())
    }

    fn pop(&mut self, ip: usize) -> Result<i32, RuntimeError> {
        let value = self.peek(ip)?;
        self.sp += 1;
        Ok(value)
    }

    fn peek(&self, ip: usize) -> Result<i32, RuntimeError> {
        if self.sp < 0 || self.sp >= self.config.memory_size {
            return Err(RuntimeError::StackUnderflow { ip });
        }
        Ok(self.memory[self.sp as usize])
    }

    fn binary(
        &mut self,
        ip: usize,
        apply: impl FnOnce(i32, i32) -> Result<i32, RuntimeError>,
    ) -> Result<(), RuntimeError> {
        let right = self.pop(ip)?;
        let left = self.pop(ip)?;
        let value = apply(left, right)?;
        self.push(value, ip)
    }

    fn cell(&mut self, address: i32, ip: usize) -> Result<&mut i32, RuntimeError> {
        usize::try_from(address)
            .ok()
            .and_then(|index| self.memory.get_mut(index))
            .ok_or(RuntimeError::InvalidAddress {
                address: i64::from(address),
                ip,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble;

    fn run(text: &str) -> Result<Outcome, RuntimeError> {
        Machine::new(assemble(text).unwrap(), VmConfig::default()).run()
    }

    #[test]
    fn arithmetic_pops_right_operand_first() {
        let outcome = run("push 10\npush 4\nsub\nhalt").unwrap();
        assert_eq!(outcome.result, Some(6));
        let outcome = run("push 12\npush 4\ndiv\nhalt").unwrap();
        assert_eq!(outcome.result, Some(3));
    }

    #[test]
    fn bleq_compares_left_to_right() {
        let text = "push 1\npush 2\nbleq yes\npush 0\nhalt\nyes:\npush 1\nhalt";
        assert_eq!(run(text).unwrap().result, Some(1));
        let text = "push 3\npush 2\nbleq yes\npush 0\nhalt\nyes:\npush 1\nhalt";
        assert_eq!(run(text).unwrap().result, Some(0));
    }

    #[test]
    fn store_pops_address_then_value() {
        // mem[0] = 42, then load it back
        let outcome = run("push 42\npush 0\nsw\npush 0\nlw\nhalt").unwrap();
        assert_eq!(outcome.result, Some(42));
    }

    #[test]
    fn jump_saves_return_address() {
        let text = "push sub\njs\nhalt\nsub:\nlra\nhalt";
        assert_eq!(run(text).unwrap().result, Some(2));
    }

    #[test]
    fn print_does_not_pop() {
        let outcome = run("push 7\nprint\npush 1\nadd\nprint\nhalt").unwrap();
        assert_eq!(outcome.output, vec![7, 8]);
        assert_eq!(outcome.result, Some(8));
    }

    #[test]
    fn empty_stack_has_no_result() {
        let outcome = run("halt").unwrap();
        assert_eq!(outcome.result, None);
        assert_eq!(outcome.steps, 1);
    }

    #[test]
    fn runtime_errors() {
        assert_eq!(
            run("push 1\npush 0\ndiv\nhalt"),
            Err(RuntimeError::DivisionByZero { ip: 2 })
        );
        assert_eq!(run("pop\nhalt"), Err(RuntimeError::StackUnderflow { ip: 0 }));
        assert!(matches!(
            run("push -5\nlw\nhalt"),
            Err(RuntimeError::InvalidAddress { address: -5, .. })
        ));
        assert!(matches!(
            run("push 99\njs"),
            Err(RuntimeError::InvalidCodeAddress { address: 99, .. })
        ));
        assert!(matches!(
            run("push 1"),
            Err(RuntimeError::InvalidCodeAddress { .. })
        ));
    }

    #[test]
    fn stack_meets_heap() {
        let config = VmConfig::new().with_memory_size(4);
        let program = assemble("push 3\nshp\nloop:\npush 0\nb loop").unwrap();
        assert_eq!(
            Machine::new(program, config).run(),
            Err(RuntimeError::StackOverflow { ip: 2 })
        );
    }

    #[test]
    fn step_limit() {
        let config = VmConfig::new().with_max_steps(100);
        let program = assemble("loop:\nb loop").unwrap();
        assert_eq!(
            Machine::new(program, config).run(),
            Err(RuntimeError::StepLimitExceeded { limit: 100 })
        );
    }
}
