/// UI layer: widget panels and the central chart/report view.
pub mod panels;
pub mod plot;
