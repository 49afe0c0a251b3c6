pub mod forgot_password;
pub mod health;
pub mod internal;
pub mod login;
pub mod logout;
pub mod me;
pub mod refresh;
pub mod register;
pub mod resend_code;
pub mod reset_password;
pub mod verify_email;
