use std::{
    fmt::{self, Display},
    iter::Sum,
    str::FromStr,
};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{
    de::{self, Visitor},
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
};
use sqlx::{
    database::{HasArguments, HasValueRef},
    encode::IsNull,
    error::BoxDynError,
    Database,
    Decode,
    Encode,
    Type,
};
use thiserror::Error;

use crate::op;

/// The number of decimal places carried by [`Amount`].
pub const AMOUNT_DECIMALS: u32 = 8;

//--------------------------------------       Amount        ---------------------------------------------------------
/// A decimal monetary amount with at most 8 decimal places.
///
/// Every amount can be represented exactly at 8 decimal places, which bounds the magnitude at roughly 7.9 × 10^20.
/// Amounts are stored as decimal strings, so no floating point is involved at any stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Amount(Decimal);

op!(binary Amount, Add, add);
op!(binary Amount, Sub, sub);
op!(inplace Amount, AddAssign, add_assign);
op!(inplace Amount, SubAssign, sub_assign);
op!(unary Amount, Neg, neg);

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, v| acc + v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountConversionError {
    #[error("{0} is not a valid decimal amount")]
    InvalidFormat(String),
    #[error("{0} has more than 8 decimal places")]
    TooPrecise(String),
    #[error("{0} is outside the range of supported amounts")]
    OutOfRange(String),
}

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn to_decimal(&self) -> Decimal {
        self.0
    }

    /// Converts a computed decimal into an amount, rounding to 8 decimal places with banker's rounding.
    pub fn from_decimal_rounded(value: Decimal) -> Result<Self, AmountConversionError> {
        let mut scaled = value.round_dp_with_strategy(AMOUNT_DECIMALS, RoundingStrategy::MidpointNearestEven);
        scaled.rescale(AMOUNT_DECIMALS);
        // `rescale` settles for fewer places when the mantissa would overflow
        if scaled.scale() != AMOUNT_DECIMALS {
            return Err(AmountConversionError::OutOfRange(value.to_string()));
        }
        Ok(Self(scaled.normalize()))
    }

    /// Adds two amounts, failing rather than losing precision when the sum leaves the supported range.
    pub fn checked_add(self, rhs: Amount) -> Result<Self, AmountConversionError> {
        let sum = self.0.checked_add(rhs.0);
        sum.ok_or_else(|| AmountConversionError::OutOfRange(format!("{self} + {rhs}"))).and_then(Self::try_from)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountConversionError;

    /// Exact conversion. Values that would need rounding are rejected.
    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.round_dp(AMOUNT_DECIMALS) != value {
            return Err(AmountConversionError::TooPrecise(value.to_string()));
        }
        Self::from_decimal_rounded(value)
    }
}

impl FromStr for Amount {
    type Err = AmountConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|_| AmountConversionError::InvalidFormat(s.to_string()))?;
        Self::try_from(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal().normalize())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a decimal amount, as a string or a number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Amount::from_str(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Amount::try_from(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Amount::try_from(Decimal::from(v)).map_err(E::custom)
    }

    // JSON numbers like 100.5 arrive as f64. The shortest round-trip representation is what the client wrote.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() {
            return Err(E::custom(AmountConversionError::InvalidFormat(v.to_string())));
        }
        Amount::from_str(&v.to_string()).map_err(E::custom)
    }
}

// Stored as TEXT. Integer columns would cap balances far below the range of `Amount`.
impl<DB: Database> Type<DB> for Amount
where String: Type<DB>
{
    fn type_info() -> DB::TypeInfo {
        <String as Type<DB>>::type_info()
    }

    fn compatible(ty: &DB::TypeInfo) -> bool {
        <String as Type<DB>>::compatible(ty)
    }
}

impl<'q, DB: Database> Encode<'q, DB> for Amount
where String: Encode<'q, DB>
{
    fn encode_by_ref(&self, buf: &mut <DB as HasArguments<'q>>::ArgumentBuffer) -> IsNull {
        <String as Encode<'q, DB>>::encode(self.to_string(), buf)
    }
}

impl<'r, DB: Database> Decode<'r, DB> for Amount
where String: Decode<'r, DB>
{
    fn decode(value: <DB as HasValueRef<'r>>::ValueRef) -> Result<Self, BoxDynError> {
        let text = <String as Decode<'r, DB>>::decode(value)?;
        Ok(Amount::from_str(&text)?)
    }
}
