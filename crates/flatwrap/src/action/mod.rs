//! Action-space flattening.
//!
//! A simulation offers, per agent and per decision point, a set of abstract
//! action types whose parameters each have a set of currently legal values.
//! This module expands that structure into an ordered list of concrete
//! actions so a policy can pick one with a single integer:
//!
//! - `combine` - cartesian product of one action type's legal parameter values
//! - `ActionSpaceEnumerator` - concatenates every offered type into an
//!   `ActionLookupTable` for one agent
//! - `ActionRegistry` / `SignatureCache` - declared parameter names per type

mod combinator;
mod descriptor;
mod enumerator;
mod lookup;

pub use combinator::{combine, combine_excluding, PRIORITY_PARAMETER};
pub use descriptor::{ActionRegistry, ActionTypeDescriptor, SignatureCache, SignatureSource};
pub use enumerator::{ActionSpaceEnumerator, ACTION_KEY};
pub use lookup::{ActionLookupTable, Binding, Combination, ConcreteAction, LegalValue};
