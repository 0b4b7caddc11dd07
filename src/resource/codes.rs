//! Required-binding value sets used by the resource bindings.

use std::fmt;

use crate::types::CodeEnum;

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $value_set:literal {
            $($(#[$vmeta:meta])* $variant:ident => $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl CodeEnum for $name {
            const VALUE_SET: &'static str = $value_set;
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }
    };
}

code_enum! {
    /// Whether an account is available to receive charges.
    AccountStatus, "http://hl7.org/fhir/ValueSet/account-status|5.0.0" {
        Active => "active",
        Inactive => "inactive",
        EnteredInError => "entered-in-error",
        /// Charges may be posted but the account is not to be billed.
        OnHold => "on-hold",
        Unknown => "unknown",
    }
}

code_enum! {
    AdverseEventStatus, "http://hl7.org/fhir/ValueSet/adverse-event-status|5.0.0" {
        InProgress => "in-progress",
        Completed => "completed",
        EnteredInError => "entered-in-error",
        Unknown => "unknown",
    }
}

code_enum! {
    /// Whether the event actually happened or only could have.
    AdverseEventActuality, "http://hl7.org/fhir/ValueSet/adverse-event-actuality|5.0.0" {
        Actual => "actual",
        Potential => "potential",
    }
}
