mod basic;
mod bulk_update;
mod paging;
