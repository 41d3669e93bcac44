// Dymo Infrastructure - System Adapters
// Implements: PrintInvoker (lpr subprocess, fake print)

pub mod fake_invoker;
pub mod lpr_invoker;

pub use fake_invoker::FakePrintInvoker;
pub use lpr_invoker::LprPrintInvoker;
