use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Column type codes reported by relational drivers, numbered as `java.sql.Types`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum SqlType {
    Bit = -7,
    TinyInt = -6,
    SmallInt = 5,
    Integer = 4,
    BigInt = -5,
    Float = 6,
    Real = 7,
    Double = 8,
    Numeric = 2,
    Decimal = 3,
    Char = 1,
    VarChar = 12,
    LongVarChar = -1,
    Date = 91,
    Time = 92,
    Timestamp = 93,
    Binary = -2,
    VarBinary = -3,
    LongVarBinary = -4,
    Null = 0,
    Other = 1111,
    JavaObject = 2000,
    Distinct = 2001,
    Struct = 2002,
    Array = 2003,
    Blob = 2004,
    Clob = 2005,
    Ref = 2006,
    DataLink = 70,
    Boolean = 16,
    RowId = -8,
    NChar = -15,
    NVarChar = -9,
    LongNVarChar = -16,
    NClob = 2011,
    SqlXml = 2009,
    RefCursor = 2012,
    TimeWithTimezone = 2013,
    TimestampWithTimezone = 2014,
}

impl SqlType {
    /// The type for a driver code, `None` for vendor specific codes.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::try_from(code).ok()
    }

    pub fn code(self) -> i32 {
        self.into()
    }

    /// Character types, whose type name may reveal a more specific content.
    pub fn is_character(self) -> bool {
        matches!(
            self,
            SqlType::Char
                | SqlType::VarChar
                | SqlType::LongVarChar
                | SqlType::NChar
                | SqlType::NVarChar
                | SqlType::LongNVarChar
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            SqlType::Bit => "BIT",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Float => "FLOAT",
            SqlType::Real => "REAL",
            SqlType::Double => "DOUBLE",
            SqlType::Numeric => "NUMERIC",
            SqlType::Decimal => "DECIMAL",
            SqlType::Char => "CHAR",
            SqlType::VarChar => "VARCHAR",
            SqlType::LongVarChar => "LONGVARCHAR",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Binary => "BINARY",
            SqlType::VarBinary => "VARBINARY",
            SqlType::LongVarBinary => "LONGVARBINARY",
            SqlType::Null => "NULL",
            SqlType::Other => "OTHER",
            SqlType::JavaObject => "JAVA_OBJECT",
            SqlType::Distinct => "DISTINCT",
            SqlType::Struct => "STRUCT",
            SqlType::Array => "ARRAY",
            SqlType::Blob => "BLOB",
            SqlType::Clob => "CLOB",
            SqlType::Ref => "REF",
            SqlType::DataLink => "DATALINK",
            SqlType::Boolean => "BOOLEAN",
            SqlType::RowId => "ROWID",
            SqlType::NChar => "NCHAR",
            SqlType::NVarChar => "NVARCHAR",
            SqlType::LongNVarChar => "LONGNVARCHAR",
            SqlType::NClob => "NCLOB",
            SqlType::SqlXml => "SQLXML",
            SqlType::RefCursor => "REF_CURSOR",
            SqlType::TimeWithTimezone => "TIME_WITH_TIMEZONE",
            SqlType::TimestampWithTimezone => "TIMESTAMP_WITH_TIMEZONE",
        }
    }
}

impl Display for SqlType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
