pub mod jwt_service;
