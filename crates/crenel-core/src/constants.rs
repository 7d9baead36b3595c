/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const AVAILABILITY_ROUTE_COMPONENT: &str = "availability";
pub const AVAILABILITY_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", AVAILABILITY_ROUTE_COMPONENT);

pub const ADMIN_ROUTE_COMPONENT: &str = "admin";
pub const ADMIN_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", ADMIN_ROUTE_COMPONENT);
