//! Types that represent the rows of the hosted store's resources, such as
//! `Transaction` and `Allocation`, and the money type `Amount`.

mod allocation;
mod amount;
mod profile;
mod transaction;

pub use allocation::{total_percentage, Allocation, NewAllocation};
pub use amount::{Amount, AmountFormat};
pub(crate) use amount::group_id;
pub use profile::Profile;
pub use transaction::{NewTransaction, Transaction, TransactionType};
