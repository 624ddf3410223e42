use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// Three-valued logic level.
///
/// The logic operators follow Verilog's treatment of unknowns: a dominant
/// operand (`0` for AND, `1` for OR) decides the result even when the other
/// operand is `X`. Equality is plain tag equality; comparing against `X`
/// does not yield `X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TruthValue {
    False,
    True,
    #[default]
    X,
}

impl TruthValue {
    pub fn to_char(self) -> char {
        match self {
            TruthValue::X => 'x',
            TruthValue::False => '0',
            TruthValue::True => '1',
        }
    }
}

impl From<bool> for TruthValue {
    fn from(value: bool) -> Self {
        if value {
            TruthValue::True
        } else {
            TruthValue::False
        }
    }
}

impl TryFrom<char> for TruthValue {
    type Error = char;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '0' => Ok(TruthValue::False),
            '1' => Ok(TruthValue::True),
            'x' | 'X' => Ok(TruthValue::X),
            other => Err(other),
        }
    }
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl Not for TruthValue {
    type Output = TruthValue;

    fn not(self) -> TruthValue {
        match self {
            TruthValue::X => TruthValue::X,
            TruthValue::False => TruthValue::True,
            TruthValue::True => TruthValue::False,
        }
    }
}

impl BitAnd for TruthValue {
    type Output = TruthValue;

    fn bitand(self, rhs: TruthValue) -> TruthValue {
        match self {
            TruthValue::False => TruthValue::False,
            TruthValue::True => rhs,
            TruthValue::X if rhs == TruthValue::False => TruthValue::False,
            TruthValue::X => TruthValue::X,
        }
    }
}

impl BitOr for TruthValue {
    type Output = TruthValue;

    fn bitor(self, rhs: TruthValue) -> TruthValue {
        match self {
            TruthValue::False => rhs,
            TruthValue::True => TruthValue::True,
            TruthValue::X if rhs == TruthValue::True => TruthValue::True,
            TruthValue::X => TruthValue::X,
        }
    }
}

impl BitXor for TruthValue {
    type Output = TruthValue;

    fn bitxor(self, rhs: TruthValue) -> TruthValue {
        match (self, rhs) {
            (TruthValue::X, _) | (_, TruthValue::X) => TruthValue::X,
            (lhs, rhs) => TruthValue::from(lhs != rhs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TruthValue::{self, False, True, X};
    use test_case::test_case;

    #[test_case(False, False => False)]
    #[test_case(False, True => False)]
    #[test_case(False, X => False)]
    #[test_case(True, False => False)]
    #[test_case(True, True => True)]
    #[test_case(True, X => X)]
    #[test_case(X, False => False)]
    #[test_case(X, True => X)]
    #[test_case(X, X => X)]
    fn test_and(a: TruthValue, b: TruthValue) -> TruthValue {
        a & b
    }

    #[test_case(False, False => False)]
    #[test_case(False, True => True)]
    #[test_case(False, X => X)]
    #[test_case(True, False => True)]
    #[test_case(True, True => True)]
    #[test_case(True, X => True)]
    #[test_case(X, False => X)]
    #[test_case(X, True => True)]
    #[test_case(X, X => X)]
    fn test_or(a: TruthValue, b: TruthValue) -> TruthValue {
        a | b
    }

    #[test_case(False, False => False)]
    #[test_case(False, True => True)]
    #[test_case(True, False => True)]
    #[test_case(True, True => False)]
    #[test_case(X, False => X)]
    #[test_case(X, True => X)]
    #[test_case(True, X => X)]
    #[test_case(X, X => X)]
    fn test_xor(a: TruthValue, b: TruthValue) -> TruthValue {
        a ^ b
    }

    #[test_case(False => True)]
    #[test_case(True => False)]
    #[test_case(X => X)]
    fn test_not(a: TruthValue) -> TruthValue {
        !a
    }

    #[test]
    fn test_equality_does_not_propagate_x() {
        assert_eq!(X, X);
        assert_ne!(X, False);
        assert_ne!(X, True);
    }

    #[test]
    fn test_char_conversion() {
        for value in [False, True, X] {
            assert_eq!(TruthValue::try_from(value.to_char()), Ok(value));
        }
        assert_eq!(TruthValue::try_from('2'), Err('2'));
        assert_eq!(TruthValue::default(), X);
        assert_eq!(True.to_string(), "1");
    }
}
