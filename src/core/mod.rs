pub mod direct_downloader;
pub mod events;
pub mod html_page;
pub mod http_client;
