pub use super::local_kv::Entity as LocalKv;
