use crate::focus_state::DetailsArea;
use crate::model::MediaType;

/// Route change requested by a screen handler; applied to the router once
/// dispatch returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavRequest {
    Navigate(String),
    Back,
}

/// Something the host should do that lives outside focus handling, such as
/// submitting a request or opening the on-screen keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    DetailsAction(DetailsArea),
    ReadMore,
    SearchField,
    Filters(MediaType),
    Refresh(String),
}
