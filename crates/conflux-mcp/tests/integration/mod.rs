mod composition;
mod dispatch;
