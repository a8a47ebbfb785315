/*
LegacyMarshal: A squad coordination bot for Discord servers.
Copyright (C) 2025 The LegacyMarshal Contributors

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
// Interest group role IDs
pub const KYBER_ROLE_ID: u64 = 1364271161000591430;
pub const VANILLA_ROLE_ID: u64 = 1364262718487531581;
pub const SWTOR_ROLE_ID: u64 = 1365936777176682547;
pub const CLASSIC_ROLE_ID: u64 = 1371897792695369778;
pub const CLASSIC_VETERAN_ROLE_ID: u64 = 1371895939786080297;

/// Desired top-to-bottom order of the tracked roles, directly beneath the
/// bot's own highest role.
pub const ROLE_ORDER: [u64; 5] = [
    KYBER_ROLE_ID,
    VANILLA_ROLE_ID,
    CLASSIC_ROLE_ID,
    CLASSIC_VETERAN_ROLE_ID,
    SWTOR_ROLE_ID,
];
