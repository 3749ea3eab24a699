//! Table state engine shared by the transactions and accounts screens
//!
//! Column registry and layout, filters with narrowing option lists, multi-key
//! sorting, row selection, search with restore, restore tokens and the
//! load lifecycle of a remote-backed table.

pub mod column;
pub mod column_state;
pub mod engine;
pub mod error;
pub mod filter;
pub mod load;
pub mod pagination;
pub mod render;
pub mod search;
pub mod selection;
pub mod sort;
pub mod token;
pub mod value;

pub use column::{Align, ColumnDefinition, ColumnRegistry, SortType};
pub use column_state::{ColumnLayout, ColumnState, VisibleColumn};
pub use engine::{TableEngine, TableView};
pub use error::{GridError, GridResult};
pub use filter::{AmountOperator, FilterField, FilterOptions, FilterOverride, FilterState, MatchOptions};
pub use load::{Debouncer, HistoryTable, LatestRequest, LoadPhase, RowSource};
pub use pagination::{paginate, Page, Pagination};
pub use render::{BuiltinRenderers, CellContent, CellContext};
pub use search::SearchController;
pub use selection::{HeaderCheck, SelectionState, SelectionSummary};
pub use sort::{SortDescriptor, SortDirection};
pub use token::{RestoreTokenCodec, TableState};
pub use value::{FieldValue, Record};
