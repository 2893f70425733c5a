mod helpers;
mod mocks;

mod orders;
mod rates;
mod routing;
mod users;
mod webhooks;
