pub mod stub_client;
