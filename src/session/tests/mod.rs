pub(crate) mod mock_gateway;
mod failure_injection;
