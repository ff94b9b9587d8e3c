mod attendance;
mod employee;
mod income;
mod note;
mod profit;
mod settings;

pub use attendance::{AttendanceRecord, AttendanceStatus, NewAttendanceRecord};
pub use employee::{Department, Employee, NewEmployee};
pub use income::{IncomeFilter, IncomeRecord, IncomeType, NewIncomeRecord};
pub use note::{NewNote, Note};
pub use profit::TaxableProfit;
pub use settings::{DEFAULT_PERCENTAGE, FiscalSettings, MAX_FISCAL_YEAR, MIN_FISCAL_YEAR};
