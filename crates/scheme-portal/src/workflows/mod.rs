pub mod applications;
pub mod edit_requests;
pub mod profiles;
pub mod schemes;
