// Thu Feb 12 2026 - Alex

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arch {
    Arm,
    RiscV,
}

impl Arch {
    /// Embedded toolchains encode the target in the tool prefix
    /// (`arm-none-eabi-`, `riscv32-unknown-elf-`).
    pub fn from_toolchain_name(name: &str) -> Self {
        if name.contains("riscv") {
            Arch::RiscV
        } else {
            Arch::Arm
        }
    }

    pub fn call_patterns(&self) -> CallPatterns {
        match self {
            Arch::Arm => CallPatterns::arm(),
            Arch::RiscV => CallPatterns::riscv(),
        }
    }
}

/// The per-architecture instruction corpus the call-graph enhancer matches
/// against. `call` must capture the hex target operand as `target`;
/// `indirect` recognizes register-indirect calls, which cannot be resolved
/// to a callee and only flag the caller.
#[derive(Debug, Clone)]
pub struct CallPatterns {
    pub call: Regex,
    pub indirect: Option<Regex>,
}

impl CallPatterns {
    pub fn new(call: Regex, indirect: Option<Regex>) -> Self {
        Self { call, indirect }
    }

    //  934:	f7ff bba8 	b.w	88 <jump_to_pbl_function>
    //  8e4:	f000 f824 	bl	930 <app_log>
    //
    // but not the operand field of a raw byte dump:
    //  805bbac:	2471 0805 b64b 0804 b3c9 0804 b459 0804     q$..K.......Y...
    pub fn arm() -> Self {
        let call = Regex::new(
            r"(?i)^\s*[0-9a-f]+:\s+[0-9a-f\s]{9}\s+BL?(?:EQ|NE|CS|HS|CC|LO|MI|PL|VS|VC|HI|LS|GE|LT|GT|LE|AL)?(?:\.W|\.N)?\s+(?P<target>[0-9a-f\s]+)",
        )
        .unwrap();
        // 805d83c:	47b0      	blx	r6
        let indirect =
            Regex::new(r"(?i)^\s*[0-9a-f]+:\s+[0-9a-f\s]{9}\s+BLX\s+(\w+)$").unwrap();
        Self::new(call, Some(indirect))
    }

    // No indirect-call pattern for RISC-V: register-indirect jumps are not
    // detected on this target.
    pub fn riscv() -> Self {
        let call = Regex::new(
            r"(?i)^\s*[0-9a-f]+:\s+[0-9a-f\s]{9}\s+(?:J|JAL|JR|JALR|BEQZ|BNEZ|BEQ|BNE|BLT|BGE|BLTU|BGEU)\s+(?P<target>[0-9a-f\s]+)",
        )
        .unwrap();
        Self::new(call, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_from_toolchain_name() {
        assert_eq!(Arch::from_toolchain_name("arm-none-eabi-"), Arch::Arm);
        assert_eq!(Arch::from_toolchain_name("riscv32-unknown-elf-"), Arch::RiscV);
    }

    #[test]
    fn test_arm_call_pattern() {
        let patterns = CallPatterns::arm();
        assert!(patterns.call.is_match("8e4:\tf000 f824 \tbl\t930 <app_log>"));
        assert!(patterns.call.is_match("934:\tf7ff bba8 \tb.w\t88 <jump_to_pbl_function>"));
        assert!(patterns.call.is_match("6c6:\td202      \tbcs.n\t88 <__aeabi_ddiv+0x6e>"));
        assert!(!patterns.call.is_match(" 89e:\te9d3 0100 \tldrd\tr0, r1, [r3]"));
    }

    #[test]
    fn test_arm_indirect_pattern() {
        let patterns = CallPatterns::arm();
        let indirect = patterns.indirect.unwrap();
        assert!(indirect.is_match(" 805d83c:\t47b0      \tblx\tr6"));
        assert!(!indirect.is_match("8e4:\tf000 f824 \tbl\t930 <app_log>"));
    }

    #[test]
    fn test_riscv_call_pattern() {
        let patterns = CallPatterns::riscv();
        assert!(patterns.call.is_match(" 10b4:\t361000ef  \tjal\t44b4 <memset>"));
        assert!(patterns.indirect.is_none());
    }
}
